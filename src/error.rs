//! Engine-level error types.
//!
//! Data-source failures are fatal to a computation and surface as
//! [`EngineError::DataUnavailable`], so callers can tell "fetch failed"
//! apart from "no data". Malformed records and zero-volume rates are handled
//! inside the pipeline and never reach this type.

use crate::core::counterparty::CounterpartyId;
use crate::repository::RepositoryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transaction data unavailable: {0}")]
    DataUnavailable(#[from] RepositoryError),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown counterparty: {0}")]
    UnknownCounterparty(CounterpartyId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// True when the failure came from the data source; the caller may retry
    /// or show a "metrics unavailable" state.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, EngineError::DataUnavailable(_))
    }
}
