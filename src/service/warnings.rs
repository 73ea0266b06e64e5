use serde::Serialize;

/// Most warnings kept at once.
pub const MAX_WARNINGS: usize = 10;

/// Rolling list of warning lines shown next to the scalar.
///
/// Identical lines are only recorded once, and when the list is full the oldest
/// line makes room for the newest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WarningLog {
    lines: Vec<String>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` unless it is already present.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.lines.contains(&message) {
            self.lines.push(message);
        }
        if self.lines.len() > MAX_WARNINGS {
            let excess = self.lines.len() - MAX_WARNINGS;
            self.lines.drain(..excess);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
