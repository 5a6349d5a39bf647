use crate::core::ledger::LedgerBook;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Global financial health metrics derived from a ledger book.
///
/// All figures are accumulated in full-precision `Decimal`; rounding only
/// happens when the metrics are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Gross approved foreign volume, independent of settlement state.
    pub total_foreign_volume: Decimal,
    pub total_local_liability_global: Decimal,
    pub total_local_paid_global: Decimal,
    /// Liability minus paid. Negative when the portfolio is net pre-paid.
    pub net_portfolio_due: Decimal,
    /// Unsettled liability in foreign units, each counterparty converted at
    /// its own effective rate. Advances net against dues.
    pub active_float_foreign: Decimal,
    /// Share of approved liability that has been paid, in `[0, 100]`.
    pub settlement_score: Decimal,
    /// Sum of positive net dues only.
    pub total_payables: Decimal,
    /// Sum of the magnitudes of negative net dues.
    pub total_advances: Decimal,
    pub counterparty_count: usize,
}

impl PortfolioMetrics {
    /// Settlement score as `f64`, for display.
    pub fn settlement_percent(&self) -> f64 {
        self.settlement_score
            .to_string()
            .parse::<f64>()
            .unwrap_or(0.0)
    }

    /// True when the portfolio has paid out more than it owes.
    pub fn is_net_prepaid(&self) -> bool {
        self.net_portfolio_due < Decimal::ZERO
    }
}

/// Compute the portfolio metrics for every ledger in `book`.
///
/// Never fails: an empty book yields zero totals and a settlement score of
/// 100, since there is nothing left to settle.
pub fn compute_portfolio_metrics(book: &LedgerBook) -> PortfolioMetrics {
    let mut total_foreign_volume = Decimal::ZERO;
    let mut total_local_liability_global = Decimal::ZERO;
    let mut total_local_paid_global = Decimal::ZERO;
    let mut active_float_foreign = Decimal::ZERO;
    let mut total_payables = Decimal::ZERO;
    let mut total_advances = Decimal::ZERO;

    for ledger in book.iter() {
        total_foreign_volume += ledger.total_foreign_inflow;
        total_local_liability_global += ledger.total_local_liability;
        total_local_paid_global += ledger.total_local_paid;
        active_float_foreign = active_float_foreign.saturating_add(ledger.float_foreign());

        if ledger.is_payable() {
            total_payables += ledger.net_local_due;
        } else if ledger.is_advance() {
            total_advances -= ledger.net_local_due;
        }
    }

    let settlement_score = settlement_score(total_local_paid_global, total_local_liability_global);
    let metrics = PortfolioMetrics {
        total_foreign_volume,
        total_local_liability_global,
        total_local_paid_global,
        net_portfolio_due: total_local_liability_global - total_local_paid_global,
        active_float_foreign,
        settlement_score,
        total_payables,
        total_advances,
        counterparty_count: book.len(),
    };
    debug!(
        "portfolio metrics: {} counterparties, net due {}, score {}",
        metrics.counterparty_count, metrics.net_portfolio_due, metrics.settlement_score
    );
    metrics
}

/// `paid / liability * 100`, clamped to `[0, 100]`; 100 when nothing is owed
/// or everything owed has been paid.
fn settlement_score(paid: Decimal, liability: Decimal) -> Decimal {
    if liability <= Decimal::ZERO || paid >= liability {
        return HUNDRED;
    }
    (paid / liability * HUNDRED).clamp(Decimal::ZERO, HUNDRED)
}

impl std::fmt::Display for PortfolioMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Portfolio Metrics ===")?;
        writeln!(f, "Counterparties:     {}", self.counterparty_count)?;
        writeln!(f, "Foreign Volume:     {}", self.total_foreign_volume.round_dp(2))?;
        writeln!(
            f,
            "Local Liability:    {}",
            self.total_local_liability_global.round_dp(2)
        )?;
        writeln!(
            f,
            "Local Paid:         {}",
            self.total_local_paid_global.round_dp(2)
        )?;
        writeln!(f, "Net Due:            {}", self.net_portfolio_due.round_dp(2))?;
        writeln!(f, "  Payables:         {}", self.total_payables.round_dp(2))?;
        writeln!(f, "  Advances:         {}", self.total_advances.round_dp(2))?;
        writeln!(
            f,
            "Active Float:       {}",
            self.active_float_foreign.round_dp(2)
        )?;
        writeln!(f, "Settlement Score:   {:.1}%", self.settlement_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::build_ledgers;
    use crate::core::transaction::{ForexRecord, PaymentRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_empty_book_is_fully_settled() {
        let metrics = compute_portfolio_metrics(&LedgerBook::new(dec!(120)));
        assert_eq!(metrics.settlement_score, dec!(100));
        assert_eq!(metrics.active_float_foreign, Decimal::ZERO);
        assert_eq!(metrics.net_portfolio_due, Decimal::ZERO);
        assert_eq!(metrics.counterparty_count, 0);
    }

    #[test]
    fn test_float_uses_each_counterparty_rate() {
        let forex = vec![
            ForexRecord::approved("A", dec!(100), dec!(10000), day()),
            ForexRecord::approved("B", dec!(100), dec!(20000), day()),
        ];
        let book = build_ledgers(&forex, &[], dec!(120));
        let metrics = compute_portfolio_metrics(&book);

        // Each ledger converts back at its own rate: 10000/100 + 20000/200.
        assert_eq!(metrics.active_float_foreign, dec!(200));
        // A portfolio-average conversion would give 30000 / 150 = 200 here too,
        // so check a case where the two differ.
        let payments = vec![PaymentRecord::new("B", dec!(20000), day())];
        let book = build_ledgers(&forex, &payments, dec!(120));
        let metrics = compute_portfolio_metrics(&book);
        assert_eq!(metrics.active_float_foreign, dec!(100));
        assert_eq!(metrics.net_portfolio_due, dec!(10000));
    }

    #[test]
    fn test_advances_net_against_dues() {
        let forex = vec![ForexRecord::approved("A", dec!(100), dec!(12000), day())];
        let payments = vec![PaymentRecord::new("B", dec!(6000), day())];
        let book = build_ledgers(&forex, &payments, dec!(120));
        let metrics = compute_portfolio_metrics(&book);

        assert_eq!(metrics.total_payables, dec!(12000));
        assert_eq!(metrics.total_advances, dec!(6000));
        assert_eq!(metrics.net_portfolio_due, dec!(6000));
        assert_eq!(metrics.active_float_foreign, dec!(50));
    }

    #[test]
    fn test_overpayment_caps_score() {
        let forex = vec![ForexRecord::approved("A", dec!(100), dec!(12000), day())];
        let payments = vec![PaymentRecord::new("A", dec!(15000), day())];
        let metrics = compute_portfolio_metrics(&build_ledgers(&forex, &payments, dec!(120)));

        assert_eq!(metrics.settlement_score, dec!(100));
        assert_eq!(metrics.net_portfolio_due, dec!(-3000));
        assert!(metrics.is_net_prepaid());
    }

    #[test]
    fn test_tiny_liability_huge_payment_scores_full() {
        let forex = vec![ForexRecord::approved("A", dec!(1), dec!(0.000001), day())];
        let payments = vec![PaymentRecord::new(
            "A",
            dec!(100000000000000000000000),
            day(),
        )];
        let metrics = compute_portfolio_metrics(&build_ledgers(&forex, &payments, dec!(120)));

        assert_eq!(metrics.settlement_score, dec!(100));
        assert!(metrics.active_float_foreign < Decimal::ZERO);
    }

    #[test]
    fn test_near_zero_rate_saturates_float() {
        let forex = vec![ForexRecord::approved(
            "A",
            dec!(10000000000),
            dec!(0.0001),
            day(),
        )];
        let payments = vec![PaymentRecord::new("A", dec!(1000000000000000), day())];
        let book = build_ledgers(&forex, &payments, dec!(120));
        let metrics = compute_portfolio_metrics(&book);

        assert_eq!(metrics.settlement_score, dec!(100));
        assert_eq!(metrics.active_float_foreign, Decimal::MIN);
        assert!(metrics.is_net_prepaid());
    }

    #[test]
    fn test_display_renders() {
        let forex = vec![ForexRecord::approved("A", dec!(100), dec!(12000), day())];
        let metrics = compute_portfolio_metrics(&build_ledgers(&forex, &[], dec!(120)));
        let text = metrics.to_string();
        assert!(text.contains("Settlement Score:   0.0%"));
        assert!(text.contains("Active Float:       100"));
    }
}
