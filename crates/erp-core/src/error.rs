//! Error types for tk-erp

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The backing store could not be read. Callers decide whether to
    /// block document creation or fall back to an empty view.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Failed to write storage: {0}")]
    StorageWrite(String),

    #[error("ERP workspace not initialized. Run 'erp init' first.")]
    NotInitialized,

    #[error("ERP workspace already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("Invalid document ID: {0}")]
    InvalidId(String),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid document kind: {0}")]
    InvalidKind(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn already_exists(kind: &'static str, id: impl Into<String>) -> Self {
        Error::AlreadyExists {
            kind,
            id: id.into(),
        }
    }
}
