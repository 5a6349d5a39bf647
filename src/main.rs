//! reconciliation-engine CLI
//!
//! Reconcile forex inflows against supplier payments and project liquidity
//! from a JSON book file.
//!
//! # Usage
//!
//! ```bash
//! # Portfolio metrics and per-counterparty ledgers
//! reconciliation-engine snapshot --input book.json
//!
//! # 60-day liquidity forecast as JSON
//! reconciliation-engine forecast --input book.json --horizon 60 --format json
//!
//! # One counterparty's balance
//! reconciliation-engine due --input book.json --counterparty SUP-0001
//!
//! # Generate a random book for testing
//! reconciliation-engine generate --counterparties 10 --records 5
//! ```

use chrono::NaiveDate;
use futures::executor::block_on;
use reconciliation_engine::config::EngineConfig;
use reconciliation_engine::core::counterparty::CounterpartyId;
use reconciliation_engine::engine::ReconciliationEngine;
use reconciliation_engine::error::EngineError;
use reconciliation_engine::repository::memory::{Book, InMemoryRepository};
use reconciliation_engine::simulation::book_generator::{generate_random_book, BookConfig};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"reconciliation-engine — FX reconciliation and liquidity forecasting

USAGE:
    reconciliation-engine <COMMAND> [OPTIONS]

COMMANDS:
    snapshot    Portfolio metrics and per-counterparty ledgers
    forecast    Project payables and inflows forward
    due         Ledger of a single counterparty
    dues        Counterparties with a non-zero balance
    activity    Recent forex, payment, and invoice activity
    generate    Generate a random book (for testing)
    help        Show this message

OPTIONS (snapshot, forecast, due, dues, activity):
    --input <FILE>          Path to JSON book file
    --config <FILE>         Path to JSON engine config
    --format <FORMAT>       Output format: text (default) or json
    --as-of <YYYY-MM-DD>    Treat this date as today
    --horizon <N>           Forecast horizon in days (forecast)
    --counterparty <ID>     Counterparty to report (due)
    --limit <N>             Number of feed items (activity)

OPTIONS (generate):
    --counterparties <N>    Number of counterparties (default: 10)
    --records <N>           Forex records per counterparty (default: 5)
    --output <FILE>         Write to file instead of stdout

ENVIRONMENT:
    RUST_LOG                Log level (e.g. warn, debug)"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Parse `--key value` pairs, rejecting anything not in `allowed`.
fn parse_options(args: &[String], allowed: &[&str]) -> HashMap<String, String> {
    let mut options = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        let key = args[i].as_str();
        if !allowed.contains(&key) {
            fail(format!("unknown option: {}", key));
        }
        i += 1;
        let value = args
            .get(i)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", key)));
        options.insert(key.trim_start_matches("--").to_string(), value);
        i += 1;
    }
    options
}

fn parse_number<T: std::str::FromStr>(options: &HashMap<String, String>, key: &str) -> Option<T> {
    options.get(key).map(|raw| {
        raw.parse()
            .unwrap_or_else(|_| fail(format!("--{} requires a number, got '{}'", key, raw)))
    })
}

fn build_engine(options: &HashMap<String, String>) -> ReconciliationEngine<InMemoryRepository> {
    let path = options
        .get("input")
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let book = Book::from_json_file(path)
        .unwrap_or_else(|e| fail(format!("could not load book '{}': {}", path, e)));

    let config = match options.get("config") {
        Some(path) => EngineConfig::from_json_file(path)
            .unwrap_or_else(|e| fail(format!("could not load config '{}': {}", path, e))),
        None => EngineConfig::default(),
    };

    let engine = ReconciliationEngine::new(InMemoryRepository::new(book), config)
        .unwrap_or_else(|e| fail(e));

    match options.get("as-of") {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .unwrap_or_else(|e| fail(format!("invalid --as-of '{}': {}", raw, e)));
            engine.with_as_of(date)
        }
        None => engine,
    }
}

fn wants_json(options: &HashMap<String, String>) -> bool {
    match options.get("format").map(String::as_str) {
        None | Some("text") => false,
        Some("json") => true,
        Some(other) => fail(format!("--format must be 'text' or 'json', got '{}'", other)),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

/// Unwrap an engine result, reporting data-source failures distinctly so
/// they are never mistaken for an empty portfolio.
fn require<T>(result: Result<T, EngineError>) -> T {
    result.unwrap_or_else(|e| {
        if e.is_data_unavailable() {
            eprintln!("Metrics unavailable: {}", e);
            process::exit(2);
        }
        fail(e)
    })
}

const ENGINE_OPTIONS: &[&str] = &["--input", "--config", "--format", "--as-of"];

fn with_engine_options(extra: &[&'static str]) -> Vec<&'static str> {
    ENGINE_OPTIONS.iter().chain(extra).copied().collect()
}

fn cmd_snapshot(args: &[String]) {
    let options = parse_options(args, &with_engine_options(&[]));
    let engine = build_engine(&options);
    let snapshot = require(block_on(engine.get_portfolio_snapshot()));

    if wants_json(&options) {
        print_json(&snapshot);
    } else {
        println!("{}", snapshot);
    }
}

fn cmd_forecast(args: &[String]) {
    let options = parse_options(args, &with_engine_options(&["--horizon"]));
    let engine = build_engine(&options);
    let horizon = parse_number(&options, "horizon").unwrap_or(engine.config().default_horizon_days);
    let forecast = require(block_on(engine.get_forecast(horizon)));

    if wants_json(&options) {
        print_json(&forecast);
    } else {
        println!("{}", forecast);
    }
}

fn cmd_due(args: &[String]) {
    let options = parse_options(args, &with_engine_options(&["--counterparty"]));
    let engine = build_engine(&options);
    let id = options
        .get("counterparty")
        .map(|raw| CounterpartyId::new(raw.as_str()))
        .unwrap_or_else(|| fail("--counterparty <ID> is required"));
    let ledger = require(block_on(engine.get_counterparty_due(&id)));

    if wants_json(&options) {
        print_json(&ledger);
    } else {
        println!("Counterparty:    {}", ledger.counterparty_id);
        println!("Foreign Inflow:  {}", ledger.total_foreign_inflow.round_dp(2));
        println!("Liability:       {}", ledger.total_local_liability.round_dp(2));
        println!("Paid:            {}", ledger.total_local_paid.round_dp(2));
        println!("Net Due:         {}", ledger.net_local_due.round_dp(2));
        println!(
            "Effective Rate:  {}{}",
            ledger.effective_rate.round_dp(4),
            if ledger.uses_fallback_rate { " (fallback)" } else { "" }
        );
    }
}

fn cmd_dues(args: &[String]) {
    let options = parse_options(args, &with_engine_options(&[]));
    let engine = build_engine(&options);
    let dues = require(block_on(engine.get_counterparties_with_due()));

    if wants_json(&options) {
        print_json(&dues);
    } else if dues.is_empty() {
        println!("All counterparties settled.");
    } else {
        for due in &dues {
            println!(
                "  {:<25} {:>18}",
                due.display_name,
                due.ledger.net_local_due.round_dp(2).to_string()
            );
        }
    }
}

fn cmd_activity(args: &[String]) {
    let options = parse_options(args, &with_engine_options(&["--limit"]));
    let engine = build_engine(&options);
    let limit = parse_number(&options, "limit").unwrap_or(engine.config().activity_limit);
    let feed = require(block_on(engine.get_activity(limit)));

    if wants_json(&options) {
        print_json(&feed);
    } else {
        for item in &feed {
            let amount = item
                .amount
                .map(|a| a.round_dp(2).to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {}  {:<20} {:<15} {:>16} {:?}",
                item.date,
                format!("{:?}", item.kind),
                item.counterparty_id.to_string(),
                amount,
                item.leg
            );
        }
    }
}

fn cmd_generate(args: &[String]) {
    let options = parse_options(args, &["--counterparties", "--records", "--output"]);
    let defaults = BookConfig::default();
    let config = BookConfig {
        counterparty_count: parse_number(&options, "counterparties")
            .unwrap_or(defaults.counterparty_count),
        forex_per_counterparty: parse_number(&options, "records")
            .unwrap_or(defaults.forex_per_counterparty),
        ..defaults
    };

    let book = generate_random_book(&config);
    let json = book.to_json_pretty().unwrap_or_else(|e| fail(e));

    if let Some(path) = options.get("output") {
        fs::write(path, &json)
            .unwrap_or_else(|e| fail(format!("could not write '{}': {}", path, e)));
        eprintln!(
            "Generated {} forex records and {} payments across {} counterparties → {}",
            book.forex.len(),
            book.payments.len(),
            book.counterparties.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "snapshot" => cmd_snapshot(rest),
        "forecast" => cmd_forecast(rest),
        "due" => cmd_due(rest),
        "dues" => cmd_dues(rest),
        "activity" => cmd_activity(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
