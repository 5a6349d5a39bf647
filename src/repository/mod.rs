//! The transaction repository seam.
//!
//! The engine reads its inputs through [`TransactionRepository`]. Storage,
//! timeouts, and retries belong to the implementation; the engine only
//! distinguishes success from a typed [`RepositoryError`].

pub mod memory;

use crate::core::counterparty::Counterparty;
use crate::core::transaction::{DateRange, ForexRecord, ForexStatus, InvoiceRecord, PaymentRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a read query against the data store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("{operation} failed: {reason}")]
    Unavailable {
        operation: &'static str,
        reason: String,
    },
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
}

/// Read-only queries over the raw transaction streams.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Forex records, optionally restricted to one status and a date range
    /// on `occurred_at`.
    async fn fetch_forex(
        &self,
        status: Option<ForexStatus>,
        range: Option<DateRange>,
    ) -> Result<Vec<ForexRecord>, RepositoryError>;

    /// Payments, optionally restricted to a date range on `paid_at`.
    async fn fetch_payments(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<PaymentRecord>, RepositoryError>;

    async fn fetch_counterparties(&self) -> Result<Vec<Counterparty>, RepositoryError>;

    /// Invoices, optionally restricted to a date range on `issued_on`.
    async fn fetch_invoices(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<InvoiceRecord>, RepositoryError>;
}
