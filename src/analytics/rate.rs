//! Exchange rate estimation from historical inflows.
//!
//! Two estimates are produced:
//!
//! - a **per-counterparty** rate, the ratio of a ledger's total local
//!   liability to its total foreign inflow;
//! - a **trailing portfolio** rate over a recent window of approved inflows,
//!   used by the liquidity forecaster together with the window's average
//!   daily inflow.
//!
//! Neither estimate ever divides by zero: when there is no usable inflow the
//! configured fallback rate is returned instead.

use crate::core::ledger::CounterpartyLedger;
use crate::core::transaction::ForexRecord;
use chrono::{Duration, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The ledger's own liability-to-inflow ratio, if it has one.
///
/// Returns `None` when the ledger has no foreign inflow or no local
/// liability, since neither yields a usable conversion rate.
///
/// A positive inflow with zero liability would give a rate of 0, which
/// cannot convert a local balance back to foreign units, so such a ledger
/// also falls back to the configured rate. The same holds when the ratio
/// is too large to represent.
pub fn derived_rate(ledger: &CounterpartyLedger) -> Option<Decimal> {
    if ledger.total_foreign_inflow <= Decimal::ZERO || ledger.total_local_liability <= Decimal::ZERO
    {
        return None;
    }
    ledger
        .total_local_liability
        .checked_div(ledger.total_foreign_inflow)
}

/// Counterparty-specific effective rate, guarded by `fallback`.
pub fn estimate_rate(ledger: &CounterpartyLedger, fallback: Decimal) -> Decimal {
    derived_rate(ledger).unwrap_or(fallback)
}

/// Aggregates of approved inflows inside a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingWindow {
    /// Last day of the window (inclusive).
    pub as_of: NaiveDate,
    /// Nominal window length in days.
    pub window_days: u32,
    pub foreign_total: Decimal,
    pub local_total: Decimal,
    pub record_count: usize,
    /// Divisor for daily averages: days since the first in-window record,
    /// at least 1 and capped at `window_days`. Zero when the window is empty.
    pub active_days: u32,
}

impl TrailingWindow {
    /// Collect approved inflows dated in `[as_of - window_days, as_of]`.
    ///
    /// A short history is never diluted over the full nominal window: the
    /// daily divisor only spans the days that actually elapsed since the
    /// first transaction in the window.
    pub fn from_history(history: &[ForexRecord], as_of: NaiveDate, window_days: u32) -> Self {
        let mut window = Self {
            as_of,
            window_days,
            foreign_total: Decimal::ZERO,
            local_total: Decimal::ZERO,
            record_count: 0,
            active_days: 0,
        };
        if window_days == 0 {
            return window;
        }

        let start = as_of - Duration::days(i64::from(window_days));
        let mut first_seen: Option<NaiveDate> = None;

        for record in history {
            if !record.is_approved() || record.occurred_at < start || record.occurred_at > as_of {
                continue;
            }
            let (foreign, local) = match record.amounts() {
                Ok(amounts) => amounts,
                Err(e) => {
                    debug!("trailing window ignores malformed record: {}", e);
                    continue;
                }
            };
            window.foreign_total += foreign;
            window.local_total += local;
            window.record_count += 1;
            first_seen = Some(match first_seen {
                Some(first) => first.min(record.occurred_at),
                None => record.occurred_at,
            });
        }

        if let Some(first) = first_seen {
            let elapsed = (as_of - first).num_days().max(1);
            let capped = elapsed.min(i64::from(window_days));
            window.active_days = u32::try_from(capped).unwrap_or(window_days);
        }
        window
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Weighted average rate over the window, or `fallback` if the window
    /// holds no foreign volume or no local liability.
    pub fn rate(&self, fallback: Decimal) -> Decimal {
        if self.foreign_total <= Decimal::ZERO || self.local_total <= Decimal::ZERO {
            return fallback;
        }
        self.local_total
            .checked_div(self.foreign_total)
            .unwrap_or(fallback)
    }

    /// Average foreign inflow per active day.
    pub fn daily_foreign_inflow(&self) -> Decimal {
        if self.active_days == 0 {
            return Decimal::ZERO;
        }
        self.foreign_total / Decimal::from(self.active_days)
    }
}

/// Portfolio-wide weighted average rate over the trailing window.
pub fn estimate_trailing_rate(
    history: &[ForexRecord],
    as_of: NaiveDate,
    window_days: u32,
    fallback: Decimal,
) -> Decimal {
    TrailingWindow::from_history(history, as_of, window_days).rate(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::counterparty::CounterpartyId;
    use crate::core::transaction::ForexStatus;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_estimate_rate_derived() {
        let mut ledger = CounterpartyLedger::new(CounterpartyId::new("X"), dec!(120));
        ledger.record_inflow(dec!(1000), dec!(120000));
        assert_eq!(estimate_rate(&ledger, dec!(99)), dec!(120));
    }

    #[test]
    fn test_estimate_rate_falls_back_without_inflow() {
        let mut ledger = CounterpartyLedger::new(CounterpartyId::new("Y"), dec!(120));
        ledger.record_payment(dec!(10000));
        assert_eq!(estimate_rate(&ledger, dec!(120)), dec!(120));
        assert_eq!(derived_rate(&ledger), None);
    }

    #[test]
    fn test_zero_liability_inflow_falls_back() {
        let mut ledger = CounterpartyLedger::new(CounterpartyId::new("Z"), dec!(120));
        ledger.record_inflow(dec!(500), dec!(0));
        assert_eq!(derived_rate(&ledger), None);
        assert_eq!(estimate_rate(&ledger, dec!(110)), dec!(110));
    }

    #[test]
    fn test_trailing_window_weighted_rate() {
        let as_of = date(2024, 6, 30);
        let history = vec![
            ForexRecord::approved("A", dec!(100), dec!(11000), date(2024, 6, 20)),
            ForexRecord::approved("B", dec!(300), dec!(37000), date(2024, 6, 25)),
        ];
        // (11000 + 37000) / (100 + 300)
        assert_eq!(
            estimate_trailing_rate(&history, as_of, 30, dec!(120)),
            dec!(120)
        );

        let window = TrailingWindow::from_history(&history, as_of, 30);
        assert_eq!(window.record_count, 2);
        assert_eq!(window.active_days, 10);
        assert_eq!(window.daily_foreign_inflow(), dec!(40));
    }

    #[test]
    fn test_trailing_window_excludes_old_future_and_unapproved() {
        let as_of = date(2024, 6, 30);
        let history = vec![
            ForexRecord::approved("A", dec!(100), dec!(10000), date(2024, 5, 1)),
            ForexRecord::approved("A", dec!(100), dec!(10000), date(2024, 7, 1)),
            ForexRecord::new("A", dec!(100), dec!(10000), date(2024, 6, 29)),
            ForexRecord::new("A", dec!(100), dec!(10000), date(2024, 6, 29))
                .with_status(ForexStatus::Rejected),
            ForexRecord::approved("A", dec!(50), dec!(6500), date(2024, 6, 28)),
        ];
        let window = TrailingWindow::from_history(&history, as_of, 30);
        assert_eq!(window.record_count, 1);
        assert_eq!(window.foreign_total, dec!(50));
        assert_eq!(window.rate(dec!(120)), dec!(130));
        assert_eq!(window.active_days, 2);
    }

    #[test]
    fn test_short_history_is_not_diluted() {
        let as_of = date(2024, 6, 30);
        let history = vec![ForexRecord::approved(
            "A",
            dec!(500),
            dec!(60000),
            date(2024, 6, 26),
        )];
        let window = TrailingWindow::from_history(&history, as_of, 30);
        // Four elapsed days, not thirty.
        assert_eq!(window.active_days, 4);
        assert_eq!(window.daily_foreign_inflow(), dec!(125));
    }

    #[test]
    fn test_divisor_capped_at_window() {
        let as_of = date(2024, 6, 30);
        let history = vec![ForexRecord::approved(
            "A",
            dec!(3000),
            dec!(360000),
            date(2024, 5, 31),
        )];
        let window = TrailingWindow::from_history(&history, as_of, 30);
        assert_eq!(window.active_days, 30);
        assert_eq!(window.daily_foreign_inflow(), dec!(100));
    }

    #[test]
    fn test_same_day_history_uses_one_day() {
        let as_of = date(2024, 6, 30);
        let history = vec![ForexRecord::approved("A", dec!(70), dec!(8400), as_of)];
        let window = TrailingWindow::from_history(&history, as_of, 30);
        assert_eq!(window.active_days, 1);
        assert_eq!(window.daily_foreign_inflow(), dec!(70));
    }

    #[test]
    fn test_empty_window_falls_back() {
        let window = TrailingWindow::from_history(&[], date(2024, 6, 30), 30);
        assert!(window.is_empty());
        assert_eq!(window.rate(dec!(120)), dec!(120));
        assert_eq!(window.daily_foreign_inflow(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_length_window_is_empty() {
        let as_of = date(2024, 6, 30);
        let history = vec![ForexRecord::approved("A", dec!(70), dec!(8400), as_of)];
        let window = TrailingWindow::from_history(&history, as_of, 0);
        assert!(window.is_empty());
        assert_eq!(window.daily_foreign_inflow(), Decimal::ZERO);
    }
}
