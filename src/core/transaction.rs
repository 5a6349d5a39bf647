use crate::core::counterparty::CounterpartyId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when a raw record fails validation.
///
/// These never escape the aggregator: the offending record is
/// skipped with a warning and the rest of the portfolio is still computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record {record} is missing required field `{field}`")]
    MissingAmount { record: Uuid, field: &'static str },
    #[error("record {record} has invalid `{field}` = {amount}")]
    NonPositiveAmount {
        record: Uuid,
        field: &'static str,
        amount: Decimal,
    },
}

/// Approval state of a forex transaction.
///
/// Only [`ForexStatus::Approved`] records take part in liability
/// and volume aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForexStatus {
    Pending,
    Approved,
    Rejected,
}

impl ForexStatus {
    pub fn is_approved(self) -> bool {
        matches!(self, ForexStatus::Approved)
    }
}

impl fmt::Display for ForexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForexStatus::Pending => "pending",
            ForexStatus::Approved => "approved",
            ForexStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Optional inclusive date filter applied by repository queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Range covering `from..=to`.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self::new(Some(from), Some(to))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// One inbound foreign-currency transaction.
///
/// Carries the foreign (USD) leg and the local-currency liability it
/// created. Amounts are optional because they come straight from nullable
/// storage columns; use [`ForexRecord::amounts`] to get validated values.
///
/// # Examples
///
/// ```
/// use reconciliation_engine::core::transaction::{ForexRecord, ForexStatus};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let record = ForexRecord::new(
///     "SUP-ACME",
///     dec!(1000),
///     dec!(120000),
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
/// )
/// .with_status(ForexStatus::Approved);
///
/// assert_eq!(record.amounts().unwrap(), (dec!(1000), dec!(120000)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForexRecord {
    pub id: Uuid,
    pub counterparty_id: CounterpartyId,
    /// The foreign-currency (USD) leg.
    #[serde(default)]
    pub foreign_amount: Option<Decimal>,
    /// The converted local-currency liability.
    #[serde(default)]
    pub local_amount: Option<Decimal>,
    pub status: ForexStatus,
    pub occurred_at: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

impl ForexRecord {
    /// Create a pending forex record with both amounts present.
    pub fn new(
        counterparty_id: impl Into<String>,
        foreign_amount: Decimal,
        local_amount: Decimal,
        occurred_at: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            counterparty_id: CounterpartyId::new(counterparty_id),
            foreign_amount: Some(foreign_amount),
            local_amount: Some(local_amount),
            status: ForexStatus::Pending,
            occurred_at,
            recorded_at: Utc::now(),
        }
    }

    /// Shorthand for an approved record.
    pub fn approved(
        counterparty_id: impl Into<String>,
        foreign_amount: Decimal,
        local_amount: Decimal,
        occurred_at: NaiveDate,
    ) -> Self {
        Self::new(counterparty_id, foreign_amount, local_amount, occurred_at)
            .with_status(ForexStatus::Approved)
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_status(mut self, status: ForexStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }

    /// Validated `(foreign_amount, local_amount)`.
    ///
    /// The foreign leg must be present and positive; the local leg must be
    /// present and non-negative.
    pub fn amounts(&self) -> Result<(Decimal, Decimal), RecordError> {
        let foreign = self.foreign_amount.ok_or(RecordError::MissingAmount {
            record: self.id,
            field: "foreign_amount",
        })?;
        let local = self.local_amount.ok_or(RecordError::MissingAmount {
            record: self.id,
            field: "local_amount",
        })?;
        if foreign <= Decimal::ZERO {
            return Err(RecordError::NonPositiveAmount {
                record: self.id,
                field: "foreign_amount",
                amount: foreign,
            });
        }
        if local < Decimal::ZERO {
            return Err(RecordError::NonPositiveAmount {
                record: self.id,
                field: "local_amount",
                amount: local,
            });
        }
        Ok((foreign, local))
    }
}

/// One outbound local-currency settlement to a counterparty.
///
/// Payments carry no status: every recorded payment is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub counterparty_id: CounterpartyId,
    #[serde(default)]
    pub local_amount: Option<Decimal>,
    pub paid_at: NaiveDate,
}

impl PaymentRecord {
    pub fn new(counterparty_id: impl Into<String>, local_amount: Decimal, paid_at: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            counterparty_id: CounterpartyId::new(counterparty_id),
            local_amount: Some(local_amount),
            paid_at,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Validated local amount, which must be present and positive.
    pub fn amount(&self) -> Result<Decimal, RecordError> {
        let amount = self.local_amount.ok_or(RecordError::MissingAmount {
            record: self.id,
            field: "local_amount",
        })?;
        if amount <= Decimal::ZERO {
            return Err(RecordError::NonPositiveAmount {
                record: self.id,
                field: "local_amount",
                amount,
            });
        }
        Ok(amount)
    }
}

/// An issued invoice. Only used by the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: Uuid,
    pub counterparty_id: CounterpartyId,
    pub invoice_number: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    pub issued_on: NaiveDate,
}

impl InvoiceRecord {
    pub fn new(
        counterparty_id: impl Into<String>,
        invoice_number: impl Into<String>,
        amount: Decimal,
        issued_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            counterparty_id: CounterpartyId::new(counterparty_id),
            invoice_number: invoice_number.into(),
            amount: Some(amount),
            issued_on,
        }
    }
}
