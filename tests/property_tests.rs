use chrono::NaiveDate;
use proptest::prelude::*;
use reconciliation_engine::analytics::aggregator::build_ledgers;
use reconciliation_engine::analytics::forecast::forecast;
use reconciliation_engine::analytics::metrics::compute_portfolio_metrics;
use reconciliation_engine::analytics::rate::TrailingWindow;
use reconciliation_engine::core::transaction::{ForexRecord, ForexStatus, PaymentRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const FALLBACK: Decimal = dec!(120);

/// Counterparty drawn from a small pool so records collide often.
fn arb_counterparty() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["A", "B", "C", "D", "E"]).prop_map(String::from)
}

fn arb_status() -> impl Strategy<Value = ForexStatus> {
    prop::sample::select(vec![
        ForexStatus::Pending,
        ForexStatus::Approved,
        ForexStatus::Rejected,
    ])
}

/// Amount in cents, 0.01 to 1,000,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Local-per-foreign rate between 80.00 and 160.00.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (8_000i64..16_000i64).prop_map(|r| Decimal::new(r, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..90).prop_map(|d| {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap() - chrono::Duration::days(d)
    })
}

fn arb_forex() -> impl Strategy<Value = ForexRecord> {
    (arb_counterparty(), arb_amount(), arb_rate(), arb_status(), arb_date()).prop_map(
        |(cp, foreign, rate, status, date)| {
            ForexRecord::new(cp, foreign, (foreign * rate).round_dp(2), date).with_status(status)
        },
    )
}

fn arb_payment() -> impl Strategy<Value = PaymentRecord> {
    (arb_counterparty(), arb_amount(), arb_date())
        .prop_map(|(cp, amount, date)| PaymentRecord::new(cp, amount * dec!(100), date))
}

fn arb_streams() -> impl Strategy<Value = (Vec<ForexRecord>, Vec<PaymentRecord>)> {
    (
        prop::collection::vec(arb_forex(), 0..40),
        prop::collection::vec(arb_payment(), 0..40),
    )
}

proptest! {
    // Settlement score always lies in [0, 100].
    #[test]
    fn settlement_score_bounded((forex, payments) in arb_streams()) {
        let metrics = compute_portfolio_metrics(&build_ledgers(&forex, &payments, FALLBACK));
        prop_assert!(metrics.settlement_score >= Decimal::ZERO);
        prop_assert!(metrics.settlement_score <= dec!(100));
    }

    // Net due is exactly liability minus paid, never clamped.
    #[test]
    fn net_due_is_unclamped_difference((forex, payments) in arb_streams()) {
        let metrics = compute_portfolio_metrics(&build_ledgers(&forex, &payments, FALLBACK));
        prop_assert_eq!(
            metrics.net_portfolio_due,
            metrics.total_local_liability_global - metrics.total_local_paid_global
        );
        prop_assert_eq!(
            metrics.net_portfolio_due,
            metrics.total_payables - metrics.total_advances
        );
    }

    // Dropping non-approved forex never changes what has been paid.
    #[test]
    fn paid_total_ignores_forex_status((forex, payments) in arb_streams()) {
        let approved_only: Vec<ForexRecord> =
            forex.iter().filter(|r| r.is_approved()).cloned().collect();

        let all = compute_portfolio_metrics(&build_ledgers(&forex, &payments, FALLBACK));
        let filtered = compute_portfolio_metrics(&build_ledgers(&approved_only, &payments, FALLBACK));

        prop_assert_eq!(all.total_local_paid_global, filtered.total_local_paid_global);
        prop_assert_eq!(all, filtered);
    }

    // Aggregating the same input twice gives identical ledgers.
    #[test]
    fn aggregation_is_idempotent((forex, payments) in arb_streams()) {
        let first = build_ledgers(&forex, &payments, FALLBACK);
        let second = build_ledgers(&forex, &payments, FALLBACK);
        prop_assert_eq!(first, second);
    }

    // Volume equals the sum of approved foreign legs.
    #[test]
    fn volume_matches_approved_inflows((forex, payments) in arb_streams()) {
        let metrics = compute_portfolio_metrics(&build_ledgers(&forex, &payments, FALLBACK));
        let expected: Decimal = forex
            .iter()
            .filter(|r| r.is_approved())
            .filter_map(|r| r.foreign_amount)
            .sum();
        prop_assert_eq!(metrics.total_foreign_volume, expected);
    }

    // The trailing divisor never exceeds the nominal window.
    #[test]
    fn trailing_divisor_capped(forex in prop::collection::vec(arb_forex(), 0..40), window in 1u32..60) {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let trailing = TrailingWindow::from_history(&forex, as_of, window);
        prop_assert!(trailing.active_days <= window);
        prop_assert_eq!(trailing.active_days == 0, trailing.is_empty());
    }

    // Summed created liability equals growth of the cumulative curve.
    #[test]
    fn forecast_round_trip(
        horizon in 0u32..120,
        payables in arb_amount(),
        rate in arb_rate(),
        daily in arb_amount(),
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let points = forecast(start, horizon, payables, rate, daily);
        prop_assert_eq!(points.len(), horizon as usize + 1);

        let created: Decimal = points.iter().map(|p| p.projected_local_liability_created).sum();
        let last = points.last().unwrap().cumulative_local_liability;
        prop_assert_eq!(created, last - payables);
    }
}
