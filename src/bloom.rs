//! Bloom's taxonomy verb check for learning objectives.
//!
//! A well-formed CLO opens with a measurable performance verb ("Identify", "Analyze",
//! ...). [`check_verb`] looks at the first word only; it is a lexical test, not a
//! grammar check.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Characters stripped from the end of the first word before lookup.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':'];

/// Cognitive level of the revised Bloom's taxonomy.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BloomCategory {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomCategory {
    pub const ALL: [BloomCategory; 6] = [
        Self::Remember,
        Self::Understand,
        Self::Apply,
        Self::Analyze,
        Self::Evaluate,
        Self::Create,
    ];

    /// Upper-case verbs listed under this category. A few verbs are listed under
    /// more than one.
    pub fn verbs(&self) -> &'static [&'static str] {
        match self {
            Self::Remember => &[
                "DEFINE", "DESCRIBE", "IDENTIFY", "LABEL", "LIST", "MATCH", "NAME", "OUTLINE",
                "RECALL", "RECOGNIZE", "REPRODUCE", "SELECT", "STATE",
            ],
            Self::Understand => &[
                "CLASSIFY", "COMPARE", "CONTRAST", "DEMONSTRATE", "DISCUSS", "DISTINGUISH",
                "ESTIMATE", "EXPLAIN", "EXTEND", "ILLUSTRATE", "INTERPRET", "PARAPHRASE",
                "PREDICT", "SUMMARIZE",
            ],
            Self::Apply => &[
                "APPLY", "CALCULATE", "CHANGE", "COMPLETE", "COMPUTE", "CONSTRUCT",
                "DRAMATIZE", "EMPLOY", "EXAMINE", "EXECUTE", "IMPLEMENT", "MODIFY", "OPERATE",
                "PRACTICE", "PREPARE", "PRODUCE", "SCHEDULE", "SHOW", "SKETCH", "SOLVE", "USE",
            ],
            Self::Analyze => &[
                "ANALYSE", "ANALYZE", "APPRAISE", "BREAKDOWN", "CATEGORIZE", "CRITICIZE",
                "DEBATE", "DIAGRAM", "DIFFERENTIATE", "DISCRIMINATE", "EXAMINE", "EXPERIMENT",
                "INFER", "INSPECT", "INVESTIGATE", "ORGANIZE", "QUESTION", "RELATE",
                "RESEARCH", "SEPARATE", "TEST",
            ],
            Self::Evaluate => &[
                "APPRAISE", "ARGUE", "ASSESS", "CHOOSE", "CONCLUDE", "CRITIQUE", "DECIDE",
                "DEFEND", "EVALUATE", "JUDGE", "JUSTIFY", "MEASURE", "PRIORITIZE", "RANK",
                "RATE", "RECOMMEND", "REVIEW", "SCORE", "SELECT", "SUPPORT", "VALIDATE",
                "VALUE", "VERIFY",
            ],
            Self::Create => &[
                "ARRANGE", "ASSEMBLE", "BUILD", "COMBINE", "COMPOSE", "CONSTRUCT", "CREATE",
                "DESIGN", "DEVELOP", "DEVISE", "FORMULATE", "GENERATE", "HYPOTHESIZE",
                "INTEGRATE", "INVENT", "MAKE", "ORIGINATE", "PLAN", "PRODUCE", "PROPOSE",
                "REARRANGE", "RECONSTRUCT", "REORGANIZE", "REVISE", "REWRITE", "SYNTHESIZE",
                "WRITE",
            ],
        }
    }
}

static VOCABULARY: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BloomCategory::ALL
        .iter()
        .flat_map(|category| category.verbs().iter().copied())
        .collect()
});

/// Outcome of [`check_verb`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbCheck {
    pub has_verb: bool,
    /// Detected verb, always upper-case.
    pub verb: Option<String>,
    /// Input with the verb capitalized, or the input unchanged on a miss.
    pub corrected_text: String,
}

impl VerbCheck {
    fn miss(text: &str) -> Self {
        Self {
            has_verb: false,
            verb: None,
            corrected_text: text.to_string(),
        }
    }
}

/// Check whether `text` opens with a Bloom's verb.
///
/// The first whitespace-delimited word is stripped of trailing `.,;:` and looked up
/// case-insensitively. On a hit the verb part of that word is rewritten in
/// Capitalized form ("identify" → "Identify"); everything else, punctuation included,
/// is left alone.
pub fn check_verb(text: &str) -> VerbCheck {
    let Some(first_word) = text.split_whitespace().next() else {
        return VerbCheck::miss(text);
    };

    let stem = first_word.trim_end_matches(TRAILING_PUNCTUATION);
    let verb = stem.to_uppercase();
    if !VOCABULARY.contains(verb.as_str()) {
        return VerbCheck::miss(text);
    }

    let start = text.len() - text.trim_start().len();
    let end = start + stem.len();
    let corrected_text = format!("{}{}{}", &text[..start], capitalize(&verb), &text[end..]);

    VerbCheck {
        has_verb: true,
        verb: Some(verb),
        corrected_text,
    }
}

/// Case-insensitive vocabulary membership.
pub fn is_blooms_verb(word: &str) -> bool {
    VOCABULARY.contains(word.to_uppercase().as_str())
}

/// Every category that lists `verb`.
pub fn categories_of(verb: &str) -> Vec<BloomCategory> {
    let verb = verb.to_uppercase();
    BloomCategory::ALL
        .into_iter()
        .filter(|category| category.verbs().contains(&verb.as_str()))
        .collect()
}

/// The first `limit` verbs in alphabetical order, for prompting authors.
pub fn suggestions(limit: usize) -> Vec<&'static str> {
    VOCABULARY.iter().copied().take(limit).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
