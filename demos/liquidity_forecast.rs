//! Liquidity forecast example.
//!
//! Generates a reproducible random book, projects liability 60 days
//! forward, and shows how the fallback rate changes the projection when
//! no recent inflows exist.

use chrono::NaiveDate;
use futures::executor::block_on;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reconciliation_engine::analytics::forecast::forecast;
use reconciliation_engine::prelude::*;
use reconciliation_engine::simulation::book_generator::{
    generate_random_book_with_rng, BookConfig,
};
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  reconciliation-engine: Liquidity Forecast    ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

    // --- Scenario 1: Forecast from a generated book ---
    println!("━━━ Scenario 1: 60-Day Forecast (25 suppliers) ━━━\n");

    let config = BookConfig {
        counterparty_count: 25,
        forex_per_counterparty: 8,
        payments_per_counterparty: 4,
        end_date: today,
        span_days: 60,
        ..Default::default()
    };
    let book = generate_random_book_with_rng(&config, &mut StdRng::seed_from_u64(42));
    let engine = ReconciliationEngine::new(InMemoryRepository::new(book), EngineConfig::default())
        .unwrap()
        .with_as_of(today);

    let projection = block_on(engine.get_forecast(60)).unwrap();
    println!("{}", projection);

    // --- Scenario 2: Quiet period ---
    println!("━━━ Scenario 2: No Recent Inflows ━━━\n");

    let quiet = forecast(today, 5, dec!(250_000), dec!(120), dec!(0));
    for point in &quiet {
        println!(
            "  {}  cumulative liability {:>14}",
            point.date,
            point.cumulative_local_liability.round_dp(2).to_string()
        );
    }
    println!("\n  With no inflow the curve stays flat at current payables.");
}
