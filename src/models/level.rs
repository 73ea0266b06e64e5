use std::fmt;

use serde::{Deserialize, Serialize};

/// A tier of the course scalar.
///
/// Conceptually ordered CLO → Topic → Subtopic → Lesson → Performance Criteria, but
/// nothing enforces a cross-level relationship: every level is its own partition with
/// its own numbering.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum ScalarLevel {
    /// Course Learning Objective
    #[serde(rename = "CLO")]
    Clo,
    Topic,
    Subtopic,
    Lesson,
    PerformanceCriteria,
}

impl ScalarLevel {
    /// Every level in conceptual order.
    pub const ALL: [ScalarLevel; 5] = [
        Self::Clo,
        Self::Topic,
        Self::Subtopic,
        Self::Lesson,
        Self::PerformanceCriteria,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clo => "CLO",
            Self::Topic => "Topic",
            Self::Subtopic => "Subtopic",
            Self::Lesson => "Lesson",
            Self::PerformanceCriteria => "PerformanceCriteria",
        }
    }

    /// Strict parse of the stored string value. Tolerant parsing of legacy data
    /// happens in [`ScalarEntry::from_value`](super::ScalarEntry::from_value) only.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CLO" => Some(Self::Clo),
            "Topic" => Some(Self::Topic),
            "Subtopic" => Some(Self::Subtopic),
            "Lesson" => Some(Self::Lesson),
            "PerformanceCriteria" => Some(Self::PerformanceCriteria),
            _ => None,
        }
    }

    /// 1-indexed (serial, text) column pair in the import template.
    ///
    /// CLO sits in B/C, and each following level two columns further right.
    pub fn template_columns(&self) -> (u32, u32) {
        match self {
            Self::Clo => (2, 3),
            Self::Topic => (4, 5),
            Self::Subtopic => (6, 7),
            Self::Lesson => (8, 9),
            Self::PerformanceCriteria => (10, 11),
        }
    }
}

impl fmt::Display for ScalarLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
