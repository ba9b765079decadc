use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),
    #[error("{kind} not found: {id}")]
    RecordNotFound { kind: &'static str, id: String },
    #[error("Ambiguous {kind} id `{prefix}` matches {matches} records")]
    AmbiguousId {
        kind: &'static str,
        prefix: String,
        matches: usize,
    },
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        CoreError::RecordNotFound {
            kind,
            id: id.to_string(),
        }
    }
}
