//! Scalar manipulation service.
//!
//! [`ScalarService`] is the single authority over one editing session's scalar: all
//! mutation goes through it so that serial uniqueness, the Bloom's verb policy for
//! CLOs and the warning/dirty bookkeeping stay consistent. Operations take effect
//! immediately in memory; [`ScalarService::save`] only hands the serialized form to
//! whoever persists the course.
//!
//! The service is single-threaded and owns its state outright. Concurrent editing
//! sessions each get their own instance.

mod error;
mod warnings;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bloom;
use crate::import;
use crate::models::{ScalarCollection, ScalarEntry, ScalarLevel};

pub use error::*;
pub use warnings::*;

/// Number of verbs offered as suggestions next to the CLO editor.
pub const SUGGESTION_COUNT: usize = 20;

/// The fields of an entry a list view needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub serial: String,
    pub text: String,
    pub order_index: u32,
}

impl From<&ScalarEntry> for DisplayEntry {
    fn from(entry: &ScalarEntry) -> Self {
        Self {
            serial: entry.serial.clone(),
            text: entry.text.clone(),
            order_index: entry.order_index,
        }
    }
}

/// Result of a successful workbook import. The collection is not installed.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub message: String,
    pub collection: ScalarCollection,
}

#[derive(Debug, Clone, Default)]
pub struct ScalarService {
    collection: ScalarCollection,
    warnings: WarningLog,
    dirty: bool,
}

fn clo_warning(serial: &str) -> String {
    format!(
        "Warning: CLO {} does not start with a Bloom's performance verb.",
        serial
    )
}

/// Check every CLO of `collection` in display order. Passing CLOs get their verb
/// capitalized; failing ones are reported and recorded in `log`.
fn validate_clos(collection: &mut ScalarCollection, log: &mut WarningLog) -> Vec<String> {
    let mut clos: Vec<&mut ScalarEntry> = collection
        .entries
        .iter_mut()
        .filter(|e| e.level == ScalarLevel::Clo)
        .collect();
    clos.sort_by_key(|e| e.order_index);

    let mut found = Vec::new();
    for clo in clos {
        let check = bloom::check_verb(&clo.text);
        if check.has_verb {
            clo.text = check.corrected_text;
        } else {
            let warning = clo_warning(&clo.serial);
            log.push(warning.clone());
            found.push(warning);
        }
    }
    found
}

impl ScalarService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self) -> &ScalarCollection {
        &self.collection
    }

    /// Install `collection` as the live scalar. Counts as an unsaved change.
    pub fn set_collection(&mut self, collection: ScalarCollection) {
        self.collection = collection;
        self.dirty = true;
    }

    pub fn warnings(&self) -> &[String] {
        self.warnings.lines()
    }

    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    /// Whether anything changed since the last save, load or session start.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ============================================================
    // CRUD
    // ============================================================

    /// Add an entry at `level`.
    ///
    /// A blank serial is replaced by the next number when `auto_number` is set. CLO
    /// text is run through the Bloom's verb check: the corrected text is stored
    /// either way and a miss adds a warning.
    pub fn add_entry(
        &mut self,
        level: ScalarLevel,
        serial: &str,
        text: &str,
        auto_number: bool,
    ) -> ServiceResult {
        let mut serial = serial.trim().to_string();
        if auto_number && serial.is_empty() {
            serial = self.get_next_serial(level);
        }
        if serial.is_empty() {
            return Err(ScalarError::SerialRequired);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(ScalarError::TextRequired);
        }

        if self.collection.find(level, &serial).is_some() {
            return Err(ScalarError::DuplicateSerial { level, serial });
        }

        let text = if level == ScalarLevel::Clo {
            self.check_clo(&serial, text)
        } else {
            text.to_string()
        };

        self.collection
            .add_entry(ScalarEntry::new(level, serial.clone(), text));
        self.dirty = true;
        tracing::debug!("Added {} entry {}", level, serial);

        Ok(format!("Added {}: {}", level, serial))
    }

    /// Change the serial and/or text of an existing entry. Blank values count as
    /// not provided.
    pub fn update_entry(
        &mut self,
        level: ScalarLevel,
        old_serial: &str,
        new_serial: Option<&str>,
        new_text: Option<&str>,
    ) -> ServiceResult {
        let new_serial = new_serial.map(str::trim).filter(|s| !s.is_empty());
        let new_text = new_text.map(str::trim).filter(|s| !s.is_empty());

        if self.collection.find(level, old_serial).is_none() {
            return Err(ScalarError::NotFound {
                level,
                serial: old_serial.to_string(),
            });
        }

        if let Some(candidate) = new_serial {
            if candidate != old_serial && self.collection.find(level, candidate).is_some() {
                return Err(ScalarError::DuplicateSerial {
                    level,
                    serial: candidate.to_string(),
                });
            }
        }

        let serial = new_serial.unwrap_or(old_serial).to_string();
        let text = new_text.map(|text| {
            if level == ScalarLevel::Clo {
                self.check_clo(&serial, text)
            } else {
                text.to_string()
            }
        });

        self.collection
            .update_entry(level, old_serial, new_serial, text.as_deref());
        self.dirty = true;
        tracing::debug!("Updated {} entry {} (now {})", level, old_serial, serial);

        Ok(format!("Updated {}: {}", level, serial))
    }

    /// Delete an entry, optionally renumbering the rest of its level `1, 2, 3, ...`.
    pub fn delete_entry(
        &mut self,
        level: ScalarLevel,
        serial: &str,
        auto_renumber: bool,
    ) -> ServiceResult {
        if !self.collection.remove_entry(level, serial) {
            return Err(ScalarError::NotFound {
                level,
                serial: serial.to_string(),
            });
        }

        if auto_renumber {
            self.collection.renumber_level(level, "");
        }
        self.dirty = true;
        tracing::debug!("Deleted {} entry {}", level, serial);

        Ok(format!("Deleted {}: {}", level, serial))
    }

    /// Reorder `level` to follow `serials_in_order`.
    ///
    /// Unlike [`ScalarCollection::reorder_level`], every listed serial must exist.
    pub fn reorder_entries(
        &mut self,
        level: ScalarLevel,
        serials_in_order: &[String],
        auto_renumber: bool,
    ) -> ServiceResult {
        if let Some(unknown) = serials_in_order
            .iter()
            .find(|serial| self.collection.find(level, serial).is_none())
        {
            return Err(ScalarError::UnknownSerial {
                level,
                serial: unknown.clone(),
            });
        }

        self.collection.reorder_level(level, serials_in_order);
        if auto_renumber {
            self.collection.renumber_level(level, "");
        }
        self.dirty = true;
        tracing::debug!("Reordered {} entries: {:?}", level, serials_in_order);

        Ok(format!("Reordered {} entries", level))
    }

    /// Swap an entry with the one above it. The level is renumbered afterwards.
    pub fn move_up(&mut self, level: ScalarLevel, serial: &str) -> ServiceResult {
        let mut serials = self.collection.serials(level);
        match serials.iter().position(|s| s == serial) {
            Some(index) if index > 0 => {
                serials.swap(index, index - 1);
                self.reorder_entries(level, &serials, true)
            }
            _ => Err(ScalarError::CannotMoveUp),
        }
    }

    /// Swap an entry with the one below it. The level is renumbered afterwards.
    pub fn move_down(&mut self, level: ScalarLevel, serial: &str) -> ServiceResult {
        let mut serials = self.collection.serials(level);
        match serials.iter().position(|s| s == serial) {
            Some(index) if index + 1 < serials.len() => {
                serials.swap(index, index + 1);
                self.reorder_entries(level, &serials, true)
            }
            _ => Err(ScalarError::CannotMoveDown),
        }
    }

    /// Remove every entry of `level`.
    pub fn clear_level(&mut self, level: ScalarLevel) -> String {
        let count = self.collection.count_by_level(level);
        self.collection.clear_level(level);
        self.dirty = true;
        format!("Cleared {} {} entries", count, level)
    }

    // ============================================================
    // Validation
    // ============================================================

    /// Run the verb check over the live CLOs. Returns the warnings found this pass.
    pub fn validate_all_clos(&mut self) -> Vec<String> {
        validate_clos(&mut self.collection, &mut self.warnings)
    }

    /// Run the verb check over a collection that is not (yet) live. Warnings still
    /// land in this session's log.
    pub fn validate_collection(&mut self, collection: &mut ScalarCollection) -> Vec<String> {
        validate_clos(collection, &mut self.warnings)
    }

    pub fn blooms_suggestions(&self) -> Vec<&'static str> {
        bloom::suggestions(SUGGESTION_COUNT)
    }

    fn check_clo(&mut self, serial: &str, text: &str) -> String {
        let check = bloom::check_verb(text);
        if !check.has_verb {
            self.warnings.push(clo_warning(serial));
        }
        check.corrected_text
    }

    // ============================================================
    // Import
    // ============================================================

    /// Build a collection from template workbook bytes without installing it.
    ///
    /// The new collection's CLOs are validated, so warnings from the workbook are
    /// recorded here even if the caller discards the result.
    pub fn import_from_spreadsheet(&mut self, bytes: &[u8]) -> Result<ImportReport, ScalarError> {
        let imported = import::import_workbook(bytes).map_err(|e| {
            tracing::warn!("Scalar import failed: {}", e);
            ScalarError::from(e)
        })?;

        let message = imported.summary();
        let mut collection = imported.collection;
        self.validate_collection(&mut collection);
        tracing::info!("{}", message);

        Ok(ImportReport {
            message,
            collection,
        })
    }

    /// Import workbook bytes and, on success, make the result the live scalar.
    pub fn import_and_install(&mut self, bytes: &[u8]) -> ServiceResult {
        let report = self.import_from_spreadsheet(bytes)?;
        self.set_collection(report.collection);
        Ok(report.message)
    }

    // ============================================================
    // Save / Load / Clear
    // ============================================================

    /// Serialized form for course storage. Clears the dirty flag.
    pub fn save(&mut self) -> Vec<Value> {
        self.dirty = false;
        self.collection.to_list()
    }

    /// Replace the live scalar with stored data and re-check its CLOs.
    pub fn load(&mut self, data: &[Value]) {
        self.collection = ScalarCollection::from_list(data);
        self.dirty = false;
        let found = self.validate_all_clos();
        tracing::debug!(
            "Loaded {} scalar entries ({} CLO warnings)",
            self.collection.len(),
            found.len()
        );
    }

    /// Drop every entry and warning. Counts as an unsaved change.
    pub fn clear(&mut self) {
        self.collection = ScalarCollection::new();
        self.warnings.clear();
        self.dirty = true;
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn get_entries_for_display(&self, level: ScalarLevel) -> Vec<DisplayEntry> {
        self.collection
            .get_by_level(level)
            .into_iter()
            .map(DisplayEntry::from)
            .collect()
    }

    pub fn get_level_count(&self, level: ScalarLevel) -> usize {
        self.collection.count_by_level(level)
    }

    pub fn get_all_counts(&self) -> BTreeMap<ScalarLevel, usize> {
        self.collection.get_counts()
    }

    /// Serial an auto-numbered entry at `level` would get.
    pub fn get_next_serial(&self, level: ScalarLevel) -> String {
        (self.get_level_count(level) + 1).to_string()
    }
}
