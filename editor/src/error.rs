//! Error types for the export definition editor.
//!
//! - [`SyncError`] - REST transport and decoding failures
//! - [`AssociationError`] - Invalid association list mutations
//! - [`ExportError`] - CSV export failures
//! - [`ConfigError`] - Endpoint configuration errors
//! - [`EditorError`] - Top-level session errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Sync Errors
// =============================================================================

/// Failures talking to the export definition backend.
///
/// Every variant is terminal for the action that raised it: nothing is retried.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never produced a response.
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },
}

// =============================================================================
// Association Errors
// =============================================================================

/// Invalid mutation target on an association list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationError {
    #[error("Association index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while exporting records through a definition.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Only the `csv` exporter is implemented.
    #[error("Unsupported exporter type: {0}")]
    UnsupportedExporter(String),

    /// A record was not a JSON object.
    #[error("Record {0} is not a JSON object")]
    InvalidRecord(usize),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Endpoint configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

// =============================================================================
// Editor Errors (top-level)
// =============================================================================

/// Errors surfaced by an [`crate::editor::EditorSession`].
#[derive(Debug, Error)]
pub enum EditorError {
    /// Backend failure during load or save.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Invalid association mutation.
    #[error("Association error: {0}")]
    Association(#[from] AssociationError),

    /// The session is loading, saving, or failed to load.
    #[error("Editor is not ready (current phase: {0})")]
    NotReady(&'static str),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for association list operations.
pub type AssociationResult<T> = Result<T, AssociationError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for editor session operations.
pub type EditorResult<T> = Result<T, EditorError>;
