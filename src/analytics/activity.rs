use crate::core::counterparty::CounterpartyId;
use crate::core::transaction::{ForexRecord, ForexStatus, InvoiceRecord, PaymentRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which stream an activity item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "status", rename_all = "lowercase")]
pub enum ActivityKind {
    Forex(ForexStatus),
    Payment,
    Invoice,
}

/// The currency leg an item's amount is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountLeg {
    Foreign,
    Local,
}

/// One entry in the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub record_id: Uuid,
    pub counterparty_id: CounterpartyId,
    pub date: NaiveDate,
    /// Raw amount as stored; may be missing on malformed rows.
    pub amount: Option<Decimal>,
    pub leg: AmountLeg,
}

impl From<&ForexRecord> for ActivityItem {
    fn from(record: &ForexRecord) -> Self {
        Self {
            kind: ActivityKind::Forex(record.status),
            record_id: record.id,
            counterparty_id: record.counterparty_id.clone(),
            date: record.occurred_at,
            amount: record.foreign_amount,
            leg: AmountLeg::Foreign,
        }
    }
}

impl From<&PaymentRecord> for ActivityItem {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            kind: ActivityKind::Payment,
            record_id: record.id,
            counterparty_id: record.counterparty_id.clone(),
            date: record.paid_at,
            amount: record.local_amount,
            leg: AmountLeg::Local,
        }
    }
}

impl From<&InvoiceRecord> for ActivityItem {
    fn from(record: &InvoiceRecord) -> Self {
        Self {
            kind: ActivityKind::Invoice,
            record_id: record.id,
            counterparty_id: record.counterparty_id.clone(),
            date: record.issued_on,
            amount: record.amount,
            leg: AmountLeg::Local,
        }
    }
}

/// Merge the three streams into a single feed, newest first.
///
/// Each stream contributes at most `limit` of its most recent items before
/// merging, and the merged feed is truncated to `limit`. Ties on date are
/// broken by record ID so the output is stable.
pub fn summarize(
    forex: &[ForexRecord],
    payments: &[PaymentRecord],
    invoices: &[InvoiceRecord],
    limit: usize,
) -> Vec<ActivityItem> {
    let mut feed = most_recent(forex.iter().map(ActivityItem::from), limit);
    feed.extend(most_recent(payments.iter().map(ActivityItem::from), limit));
    feed.extend(most_recent(invoices.iter().map(ActivityItem::from), limit));
    sort_newest_first(&mut feed);
    feed.truncate(limit);
    feed
}

fn most_recent(items: impl Iterator<Item = ActivityItem>, limit: usize) -> Vec<ActivityItem> {
    let mut items: Vec<ActivityItem> = items.collect();
    sort_newest_first(&mut items);
    items.truncate(limit);
    items
}

fn sort_newest_first(items: &mut [ActivityItem]) {
    items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.record_id.cmp(&b.record_id)));
}
