use crate::core::counterparty::Counterparty;
use crate::core::ledger::LedgerBook;
use crate::core::transaction::{ForexRecord, PaymentRecord};
use log::{debug, warn};
use rust_decimal::Decimal;

/// Fold forex inflows and payments into one running balance per counterparty.
///
/// Only approved forex records contribute to inflow and liability; payments
/// always count. A counterparty is materialized the first time any record
/// references it, so idle counterparties never appear. Malformed records are
/// skipped with a warning and counted in [`LedgerBook::skipped_records`].
///
/// The result is a fresh book on every call; no state is kept between calls.
///
/// # Examples
///
/// ```
/// use reconciliation_engine::analytics::aggregator::build_ledgers;
/// use reconciliation_engine::core::counterparty::CounterpartyId;
/// use reconciliation_engine::core::transaction::{ForexRecord, PaymentRecord};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let forex = vec![ForexRecord::approved("X", dec!(1000), dec!(120000), day)];
/// let payments = vec![PaymentRecord::new("X", dec!(60000), day)];
///
/// let book = build_ledgers(&forex, &payments, dec!(120));
/// let ledger = book.get(&CounterpartyId::new("X")).unwrap();
/// assert_eq!(ledger.net_local_due, dec!(60000));
/// ```
pub fn build_ledgers(
    forex: &[ForexRecord],
    payments: &[PaymentRecord],
    fallback_rate: Decimal,
) -> LedgerBook {
    let mut book = LedgerBook::new(fallback_rate);
    accumulate(&mut book, forex, payments);
    book
}

/// Like [`build_ledgers`], but every counterparty in `roster` gets a ledger
/// even when it has no activity.
pub fn build_ledgers_with_roster(
    roster: &[Counterparty],
    forex: &[ForexRecord],
    payments: &[PaymentRecord],
    fallback_rate: Decimal,
) -> LedgerBook {
    let mut book = LedgerBook::new(fallback_rate);
    for counterparty in roster {
        book.entry(&counterparty.id);
    }
    accumulate(&mut book, forex, payments);
    book
}

fn accumulate(book: &mut LedgerBook, forex: &[ForexRecord], payments: &[PaymentRecord]) {
    for record in forex {
        if !record.is_approved() {
            continue;
        }
        match record.amounts() {
            Ok((foreign, local)) => book
                .entry(&record.counterparty_id)
                .record_inflow(foreign, local),
            Err(e) => {
                warn!("skipping forex record for {}: {}", record.counterparty_id, e);
                book.mark_skipped();
            }
        }
    }

    for payment in payments {
        match payment.amount() {
            Ok(amount) => book.entry(&payment.counterparty_id).record_payment(amount),
            Err(e) => {
                warn!("skipping payment for {}: {}", payment.counterparty_id, e);
                book.mark_skipped();
            }
        }
    }

    book.resolve_rates();
    debug!(
        "built {} counterparty ledgers from {} forex / {} payment records ({} skipped)",
        book.len(),
        forex.len(),
        payments.len(),
        book.skipped_records()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::counterparty::CounterpartyId;
    use crate::core::transaction::ForexStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_single_counterparty() {
        let forex = vec![
            ForexRecord::approved("X", dec!(1000), dec!(120000), day()),
            ForexRecord::approved("X", dec!(500), dec!(62500), day()),
        ];
        let payments = vec![PaymentRecord::new("X", dec!(60000), day())];

        let book = build_ledgers(&forex, &payments, dec!(120));
        let x = book.get(&CounterpartyId::new("X")).unwrap();

        assert_eq!(x.total_foreign_inflow, dec!(1500));
        assert_eq!(x.total_local_liability, dec!(182500));
        assert_eq!(x.total_local_paid, dec!(60000));
        assert_eq!(x.net_local_due, dec!(122500));
        assert!(!x.uses_fallback_rate);
    }

    #[test]
    fn test_non_approved_forex_excluded() {
        let forex = vec![
            ForexRecord::new("X", dec!(1000), dec!(120000), day()),
            ForexRecord::new("X", dec!(1000), dec!(120000), day())
                .with_status(ForexStatus::Rejected),
        ];
        let book = build_ledgers(&forex, &[], dec!(120));
        assert!(book.is_empty());
    }

    #[test]
    fn test_one_sided_counterparties_materialize() {
        let forex = vec![ForexRecord::approved("F", dec!(10), dec!(1200), day())];
        let payments = vec![PaymentRecord::new("P", dec!(300), day())];

        let book = build_ledgers(&forex, &payments, dec!(120));
        assert_eq!(book.len(), 2);

        let f = book.get(&CounterpartyId::new("F")).unwrap();
        assert_eq!(f.total_local_paid, Decimal::ZERO);

        let p = book.get(&CounterpartyId::new("P")).unwrap();
        assert_eq!(p.total_local_liability, Decimal::ZERO);
        assert_eq!(p.net_local_due, dec!(-300));
        assert!(p.uses_fallback_rate);
    }

    #[test]
    fn test_malformed_records_skipped() {
        let mut broken_forex = ForexRecord::approved("X", dec!(10), dec!(1200), day());
        broken_forex.foreign_amount = None;
        let mut broken_payment = PaymentRecord::new("X", dec!(1), day());
        broken_payment.local_amount = Some(Decimal::ZERO);

        let forex = vec![
            broken_forex,
            ForexRecord::approved("X", dec!(20), dec!(2400), day()),
        ];
        let payments = vec![broken_payment, PaymentRecord::new("X", dec!(400), day())];

        let book = build_ledgers(&forex, &payments, dec!(120));
        let x = book.get(&CounterpartyId::new("X")).unwrap();
        assert_eq!(book.skipped_records(), 2);
        assert_eq!(x.total_foreign_inflow, dec!(20));
        assert_eq!(x.total_local_paid, dec!(400));
    }

    #[test]
    fn test_unapproved_malformed_record_not_counted_as_skipped() {
        let mut pending = ForexRecord::new("X", dec!(10), dec!(1200), day());
        pending.local_amount = None;
        let book = build_ledgers(&[pending], &[], dec!(120));
        assert_eq!(book.skipped_records(), 0);
    }

    #[test]
    fn test_roster_preseeds_idle_counterparties() {
        let roster = vec![
            Counterparty::new("IDLE", "Idle Supplier Ltd"),
            Counterparty::new("X", "Active Supplier"),
        ];
        let forex = vec![ForexRecord::approved("X", dec!(10), dec!(1300), day())];

        let book = build_ledgers_with_roster(&roster, &forex, &[], dec!(120));
        assert_eq!(book.len(), 2);

        let idle = book.get(&CounterpartyId::new("IDLE")).unwrap();
        assert_eq!(idle.net_local_due, Decimal::ZERO);
        assert_eq!(idle.effective_rate, dec!(120));

        let x = book.get(&CounterpartyId::new("X")).unwrap();
        assert_eq!(x.effective_rate, dec!(130));
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let forex = vec![
            ForexRecord::approved("A", dec!(333.33), dec!(40000.01), day()),
            ForexRecord::approved("B", dec!(17), dec!(2100.5), day()),
        ];
        let payments = vec![PaymentRecord::new("A", dec!(1234.56), day())];

        let first = build_ledgers(&forex, &payments, dec!(120));
        let second = build_ledgers(&forex, &payments, dec!(120));
        assert_eq!(first, second);
    }
}
