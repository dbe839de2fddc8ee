use thiserror::Error;

/// Errors produced while building, persisting, or loading an index.
///
/// Query-side problems are deliberately not represented here: a malformed
/// query yields diagnostics plus a best-effort result, and an unknown term
/// is an empty posting list, not an error.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed index file {path}: {reason}")]
    Format { path: String, reason: String },

    #[error("metadata error: {0}")]
    Meta(#[from] serde_json::Error),
}

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
