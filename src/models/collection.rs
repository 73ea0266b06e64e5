use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ScalarEntry, ScalarLevel};

/// Every scalar entry of one course.
///
/// Entries are kept in insertion order; display order within a level comes from
/// `order_index`. The collection deliberately does not police serial uniqueness:
/// that is [`ScalarService`](crate::service::ScalarService)'s job, and the raw
/// `entries` vector will happily hold duplicates if callers bypass it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarCollection {
    pub entries: Vec<ScalarEntry>,
}

impl ScalarCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `level`, ascending by `order_index`. Ties keep insertion order.
    pub fn get_by_level(&self, level: ScalarLevel) -> Vec<&ScalarEntry> {
        let mut entries: Vec<&ScalarEntry> =
            self.entries.iter().filter(|e| e.level == level).collect();
        entries.sort_by_key(|e| e.order_index);
        entries
    }

    /// Serials of `level` in display order.
    pub fn serials(&self, level: ScalarLevel) -> Vec<String> {
        self.get_by_level(level)
            .into_iter()
            .map(|e| e.serial.clone())
            .collect()
    }

    pub fn find(&self, level: ScalarLevel, serial: &str) -> Option<&ScalarEntry> {
        self.entries
            .iter()
            .find(|e| e.level == level && e.serial == serial)
    }

    pub fn find_mut(&mut self, level: ScalarLevel, serial: &str) -> Option<&mut ScalarEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.level == level && e.serial == serial)
    }

    pub fn count_by_level(&self, level: ScalarLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// Counts for all five levels, zeros included.
    pub fn get_counts(&self) -> BTreeMap<ScalarLevel, usize> {
        ScalarLevel::ALL
            .into_iter()
            .map(|level| (level, self.count_by_level(level)))
            .collect()
    }

    /// Append an entry, giving it the next position in its level when its
    /// `order_index` is the unassigned sentinel `0`.
    pub fn add_entry(&mut self, mut entry: ScalarEntry) {
        if entry.order_index == 0 {
            entry.order_index = next_position(self.count_by_level(entry.level));
        }
        self.entries.push(entry);
    }

    /// Remove the first entry matching `(level, serial)`.
    pub fn remove_entry(&mut self, level: ScalarLevel, serial: &str) -> bool {
        match self
            .entries
            .iter()
            .position(|e| e.level == level && e.serial == serial)
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Overwrite serial and/or text of the first match. No duplicate checking.
    pub fn update_entry(
        &mut self,
        level: ScalarLevel,
        serial: &str,
        new_serial: Option<&str>,
        new_text: Option<&str>,
    ) -> bool {
        let Some(entry) = self.find_mut(level, serial) else {
            return false;
        };
        if let Some(new_serial) = new_serial {
            entry.serial = new_serial.to_string();
        }
        if let Some(new_text) = new_text {
            entry.text = new_text.to_string();
        }
        true
    }

    /// Rewrite `order_index` so the listed serials take positions 1, 2, 3, ...
    ///
    /// Serials not present in the level are skipped (their position number is still
    /// consumed), and entries missing from the list keep their current index.
    pub fn reorder_level(&mut self, level: ScalarLevel, serials_in_order: &[String]) {
        for (position, serial) in serials_in_order.iter().enumerate() {
            // Duplicated serials resolve to the last one stored.
            if let Some(entry) = self
                .entries
                .iter_mut()
                .rev()
                .find(|e| e.level == level && &e.serial == serial)
            {
                entry.order_index = next_position(position);
            }
        }
    }

    /// Renumber `level` as `{prefix}1, {prefix}2, ...` following display order, and
    /// reset `order_index` to match.
    pub fn renumber_level(&mut self, level: ScalarLevel, prefix: &str) {
        let mut positions: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.level == level)
            .map(|(i, _)| i)
            .collect();
        positions.sort_by_key(|&i| self.entries[i].order_index);

        for (position, index) in positions.into_iter().enumerate() {
            let number = next_position(position);
            let entry = &mut self.entries[index];
            entry.serial = format!("{}{}", prefix, number);
            entry.order_index = number;
        }
    }

    /// Serialize to the plain list-of-mappings form kept by course storage.
    pub fn to_list(&self) -> Vec<Value> {
        self.entries.iter().map(ScalarEntry::to_value).collect()
    }

    /// Rebuild from stored data. Never fails; see [`ScalarEntry::from_value`].
    pub fn from_list(data: &[Value]) -> Self {
        Self {
            entries: data.iter().map(ScalarEntry::from_value).collect(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn clear_level(&mut self, level: ScalarLevel) {
        self.entries.retain(|e| e.level != level);
    }
}

/// 1-based position following `count` existing items.
fn next_position(count: usize) -> u32 {
    u32::try_from(count).map_or(u32::MAX, |n| n.saturating_add(1))
}
