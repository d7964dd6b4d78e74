use chrono::NaiveDate;
use thiserror::Error;

/// Error type that captures ledger command and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("Duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn duplicate(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::DuplicateId {
            entity,
            id: id.into(),
        }
    }

    pub fn overflow() -> Self {
        LedgerError::Validation("amount overflows the ledger totals".into())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
