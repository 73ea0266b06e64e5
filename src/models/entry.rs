use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::ScalarLevel;

/// Longest text shown by the `Display` impl before truncating.
const DISPLAY_TEXT_LIMIT: usize = 50;

/// One addressable item in the course scalar.
///
/// Entries have no identity beyond `(level, serial)` and live only as long as the
/// [`ScalarCollection`](super::ScalarCollection) that owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarEntry {
    pub level: ScalarLevel,
    /// Human-facing number such as `"1"` or `"1.1"`. Unique within a level.
    pub serial: String,
    pub text: String,
    /// Position within the level. `0` means unassigned and is replaced on insert.
    #[serde(default)]
    pub order_index: u32,
    /// Informal pointer to an entry at a parent level. Never validated.
    #[serde(default)]
    pub parent_serial: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ScalarEntry {
    pub fn new(level: ScalarLevel, serial: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            serial: serial.into(),
            text: text.into(),
            order_index: 0,
            parent_serial: None,
            metadata: Map::new(),
        }
    }

    pub fn with_order_index(mut self, order_index: u32) -> Self {
        self.order_index = order_index;
        self
    }

    pub fn with_parent(mut self, parent_serial: impl Into<String>) -> Self {
        self.parent_serial = Some(parent_serial.into());
        self
    }

    /// Plain mapping used by course storage.
    pub fn to_value(&self) -> Value {
        json!({
            "level": self.level.as_str(),
            "serial": self.serial,
            "text": self.text,
            "order_index": self.order_index,
            "parent_serial": self.parent_serial,
            "metadata": self.metadata,
        })
    }

    /// Rebuild an entry from stored data.
    ///
    /// Stored scalars predate the level enum, so this never fails: missing fields take
    /// their defaults and a missing or unrecognised `level` is read as CLO.
    pub fn from_value(data: &Value) -> Self {
        let level = match data.get("level").and_then(Value::as_str) {
            Some(raw) => ScalarLevel::from_str(raw).unwrap_or_else(|| {
                tracing::warn!("Unknown scalar level {:?} in stored data, reading as CLO", raw);
                ScalarLevel::Clo
            }),
            None => ScalarLevel::Clo,
        };

        let string_field = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let order_index = data
            .get("order_index")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);

        Self {
            level,
            serial: string_field("serial"),
            text: string_field("text"),
            order_index,
            parent_serial: data
                .get("parent_serial")
                .and_then(Value::as_str)
                .map(str::to_string),
            metadata: data
                .get("metadata")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for ScalarEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.chars().count() > DISPLAY_TEXT_LIMIT {
            let head: String = self.text.chars().take(DISPLAY_TEXT_LIMIT).collect();
            write!(f, "{}: {}...", self.serial, head)
        } else {
            write!(f, "{}: {}", self.serial, self.text)
        }
    }
}
