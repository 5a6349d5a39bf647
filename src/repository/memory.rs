use crate::core::counterparty::Counterparty;
use crate::core::transaction::{DateRange, ForexRecord, ForexStatus, InvoiceRecord, PaymentRecord};
use crate::error::Result;
use crate::repository::{RepositoryError, TransactionRepository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A snapshot of all four record streams, loadable from JSON.
///
/// Expected file layout:
///
/// ```json
/// {
///   "counterparties": [{ "id": "SUP-ACME", "display_name": "Acme Ltd" }],
///   "forex": [{
///     "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
///     "counterparty_id": "SUP-ACME",
///     "foreign_amount": "1000", "local_amount": "120000",
///     "status": "approved",
///     "occurred_at": "2024-03-01", "recorded_at": "2024-03-01T10:00:00Z"
///   }],
///   "payments": [],
///   "invoices": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub counterparties: Vec<Counterparty>,
    #[serde(default)]
    pub forex: Vec<ForexRecord>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub invoices: Vec<InvoiceRecord>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparties.push(counterparty);
        self
    }

    pub fn with_forex(mut self, record: ForexRecord) -> Self {
        self.forex.push(record);
        self
    }

    pub fn with_payment(mut self, record: PaymentRecord) -> Self {
        self.payments.push(record);
        self
    }

    pub fn with_invoice(mut self, record: InvoiceRecord) -> Self {
        self.invoices.push(record);
        self
    }
}

/// Repository backed by an in-memory [`Book`].
///
/// Applies the same filters a storage-backed adapter would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    book: Book,
}

impl InMemoryRepository {
    pub fn new(book: Book) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }
}

fn in_range(range: &Option<DateRange>, date: chrono::NaiveDate) -> bool {
    range.as_ref().map_or(true, |r| r.contains(date))
}

#[async_trait]
impl TransactionRepository for InMemoryRepository {
    async fn fetch_forex(
        &self,
        status: Option<ForexStatus>,
        range: Option<DateRange>,
    ) -> std::result::Result<Vec<ForexRecord>, RepositoryError> {
        Ok(self
            .book
            .forex
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .filter(|r| in_range(&range, r.occurred_at))
            .cloned()
            .collect())
    }

    async fn fetch_payments(
        &self,
        range: Option<DateRange>,
    ) -> std::result::Result<Vec<PaymentRecord>, RepositoryError> {
        Ok(self
            .book
            .payments
            .iter()
            .filter(|r| in_range(&range, r.paid_at))
            .cloned()
            .collect())
    }

    async fn fetch_counterparties(
        &self,
    ) -> std::result::Result<Vec<Counterparty>, RepositoryError> {
        Ok(self.book.counterparties.clone())
    }

    async fn fetch_invoices(
        &self,
        range: Option<DateRange>,
    ) -> std::result::Result<Vec<InvoiceRecord>, RepositoryError> {
        Ok(self
            .book
            .invoices
            .iter()
            .filter(|r| in_range(&range, r.issued_on))
            .cloned()
            .collect())
    }
}
