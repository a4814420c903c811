//! Error handling for reconx-store
//!
//! Wraps reconx-core ExError with store-specific helpers

use reconx_core::errors::{ExError, ExErrorKind};
use reconx_core::DocumentKind;
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a settings validation error
pub fn settings_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidSettings)
        .with_op("settings_parse")
        .with_message(reason.to_string())
}

/// Create a persistence error for a document that could not be written back
pub fn persist_error(document: DocumentKind, path: &Path, err: ExError) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("persist_document")
        .with_document(document)
        .with_path(path.display().to_string())
        .with_message("document left unchanged on disk")
        .with_source(err)
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
