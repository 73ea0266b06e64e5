//! Scalar import from the course template workbook.
//!
//! # Template contract
//!
//! - Rows 1-5 hold the template header and are ignored; data starts on row 6.
//! - Each level occupies a (serial, text) column pair, in level order:
//!   CLO B/C, Topic D/E, Subtopic F/G, Lesson H/I, Performance Criteria J/K.
//! - A row may carry entries for several levels at once. Blank pairs are skipped.

mod xlsx;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{ScalarCollection, ScalarEntry, ScalarLevel};

use xlsx::{read_active_sheet, SheetGrid};

pub use xlsx::MAX_PART_BYTES;

/// First data row of the template (1-indexed).
pub const DATA_START_ROW: u32 = 6;

/// Workbook parse errors.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("not a readable workbook archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("malformed workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to read workbook part: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook part xl/workbook.xml is missing")]
    MissingWorkbook,

    #[error("worksheet part {0} is missing")]
    MissingPart(String),

    #[error("No active sheet found in workbook")]
    NoActiveSheet,

    #[error("workbook part {0} is larger than {limit} bytes once decompressed", limit = MAX_PART_BYTES)]
    PartTooLarge(String),
}

/// A collection built from a workbook, with per-level entry counts.
#[derive(Debug, Clone, Default)]
pub struct ImportedScalar {
    pub collection: ScalarCollection,
    pub counts: BTreeMap<ScalarLevel, usize>,
}

impl ImportedScalar {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// e.g. `"Imported 12 entries: 3 CLOs, 5 Topics, 4 Lessons"`.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = ScalarLevel::ALL
            .into_iter()
            .filter_map(|level| {
                let count = self.counts.get(&level).copied().unwrap_or(0);
                (count > 0).then(|| format!("{} {}s", count, level))
            })
            .collect();

        if parts.is_empty() {
            format!("Imported {} entries", self.total())
        } else {
            format!("Imported {} entries: {}", self.total(), parts.join(", "))
        }
    }
}

/// Read the active sheet of `bytes` and build a collection from the template layout.
pub fn import_workbook(bytes: &[u8]) -> Result<ImportedScalar, ImportError> {
    let grid = read_active_sheet(bytes)?;
    Ok(build_collection(&grid))
}

/// Turn a sheet grid into scalar entries.
///
/// Each level keeps a running counter of emitted entries; it becomes the entry's
/// `order_index` and stands in for a blank serial cell.
fn build_collection(grid: &SheetGrid) -> ImportedScalar {
    let mut imported = ImportedScalar {
        collection: ScalarCollection::new(),
        counts: ScalarLevel::ALL.into_iter().map(|level| (level, 0)).collect(),
    };

    for row in grid.rows_from(DATA_START_ROW) {
        for level in ScalarLevel::ALL {
            let (serial_column, text_column) = level.template_columns();
            let serial = grid.cell(row, serial_column);
            let text = grid.cell(row, text_column);
            if serial.is_empty() && text.is_empty() {
                continue;
            }

            let counter = imported.counts.entry(level).or_insert(0);
            *counter += 1;
            let position = *counter;
            let serial = if serial.is_empty() {
                position.to_string()
            } else {
                serial.to_string()
            };

            imported.collection.add_entry(
                ScalarEntry::new(level, serial, text)
                    .with_order_index(u32::try_from(position).unwrap_or(u32::MAX)),
            );
        }
    }

    tracing::debug!("Built scalar from workbook: {}", imported.summary());
    imported
}
