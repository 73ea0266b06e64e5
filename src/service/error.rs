use thiserror::Error;

use crate::import::ImportError;
use crate::models::ScalarLevel;

/// Why a service operation was refused.
///
/// Every variant is recoverable and leaves the collection untouched. The display
/// text is written for direct display to the author.
#[derive(Debug, Error)]
pub enum ScalarError {
    #[error("Serial number is required")]
    SerialRequired,

    #[error("Text content is required")]
    TextRequired,

    #[error("Serial '{serial}' already exists for {level}")]
    DuplicateSerial { level: ScalarLevel, serial: String },

    #[error("Entry not found: {level} {serial}")]
    NotFound { level: ScalarLevel, serial: String },

    #[error("Serial '{serial}' not found in {level}")]
    UnknownSerial { level: ScalarLevel, serial: String },

    #[error("Cannot move up: already at top or not found")]
    CannotMoveUp,

    #[error("Cannot move down: already at bottom or not found")]
    CannotMoveDown,

    #[error("Error reading Excel file: {0}")]
    Import(#[from] ImportError),
}

/// Success message or the reason for refusal.
pub type ServiceResult = Result<String, ScalarError>;
