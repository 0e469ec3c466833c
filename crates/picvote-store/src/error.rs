use thiserror::Error;

/// Errors produced by the store layer.
///
/// Ledger failures are not recovered here; callers surface them directly.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing a ledger file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A ledger file contained malformed JSON.
    #[error("Malformed ledger file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
