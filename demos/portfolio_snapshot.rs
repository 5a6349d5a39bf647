//! Portfolio snapshot example.
//!
//! Reconciles a handful of suppliers paid in local currency against
//! forex inflows, then prints the global metrics and balances.

use chrono::{Duration, NaiveDate};
use futures::executor::block_on;
use reconciliation_engine::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  reconciliation-engine: Portfolio Snapshot    ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let days_ago = |n: i64| today - Duration::days(n);

    let book = Book::new()
        .with_counterparty(Counterparty::new("SUP-SHENZHEN", "Shenzhen Components"))
        .with_counterparty(Counterparty::new("SUP-GUANGZHOU", "Guangzhou Textiles"))
        .with_counterparty(Counterparty::new("SUP-NINGBO", "Ningbo Logistics"))
        .with_forex(ForexRecord::approved("SUP-SHENZHEN", dec!(10_000), dec!(1_200_000), days_ago(20)))
        .with_forex(ForexRecord::approved("SUP-SHENZHEN", dec!(5_000), dec!(615_000), days_ago(6)))
        .with_forex(ForexRecord::approved("SUP-GUANGZHOU", dec!(8_000), dec!(944_000), days_ago(12)))
        .with_forex(ForexRecord::new("SUP-GUANGZHOU", dec!(3_000), dec!(360_000), days_ago(1)))
        .with_payment(PaymentRecord::new("SUP-SHENZHEN", dec!(900_000), days_ago(4)))
        .with_payment(PaymentRecord::new("SUP-GUANGZHOU", dec!(944_000), days_ago(2)))
        .with_payment(PaymentRecord::new("SUP-NINGBO", dec!(60_000), days_ago(3)));

    let engine = ReconciliationEngine::new(InMemoryRepository::new(book), EngineConfig::default())
        .unwrap()
        .with_as_of(today);

    // --- Scenario 1: Global metrics ---
    println!("━━━ Scenario 1: Portfolio Metrics ━━━\n");
    let snapshot = block_on(engine.get_portfolio_snapshot()).unwrap();
    println!("{}", snapshot);

    // --- Scenario 2: Outstanding balances ---
    println!("━━━ Scenario 2: Counterparties With Balance ━━━\n");
    for due in block_on(engine.get_counterparties_with_due()).unwrap() {
        let label = if due.ledger.is_payable() { "owed" } else { "advance" };
        println!(
            "  {:<22} {:>14} ({})",
            due.display_name,
            due.ledger.net_local_due.round_dp(2).to_string(),
            label
        );
    }
    println!();

    // --- Scenario 3: Recent activity ---
    println!("━━━ Scenario 3: Recent Activity ━━━\n");
    for item in block_on(engine.get_activity(5)).unwrap() {
        println!(
            "  {}  {:<30} {}",
            item.date,
            format!("{:?}", item.kind),
            item.counterparty_id
        );
    }
}
