//! Random transaction books for benchmarks and demos.
//!
//! Generates counterparties with forex inflows of mixed status, rates
//! jittered around a base rate, partial payments, and invoices.

use crate::core::counterparty::Counterparty;
use crate::core::transaction::{ForexRecord, ForexStatus, InvoiceRecord, PaymentRecord};
use crate::repository::memory::Book;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random book.
#[derive(Debug, Clone)]
pub struct BookConfig {
    pub counterparty_count: usize,
    pub forex_per_counterparty: usize,
    pub payments_per_counterparty: usize,
    pub invoices_per_counterparty: usize,
    /// Centre of the generated local-per-foreign rates.
    pub base_rate: Decimal,
    /// Maximum relative deviation from `base_rate`, e.g. 0.05 for ±5%.
    pub rate_jitter: f64,
    pub min_foreign_amount: Decimal,
    pub max_foreign_amount: Decimal,
    /// Probability that a generated forex record is approved.
    pub approval_ratio: f64,
    /// Last day records may be dated on.
    pub end_date: NaiveDate,
    /// Records are spread over this many days before `end_date`.
    pub span_days: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            counterparty_count: 10,
            forex_per_counterparty: 5,
            payments_per_counterparty: 3,
            invoices_per_counterparty: 1,
            base_rate: Decimal::from(120),
            rate_jitter: 0.05,
            min_foreign_amount: Decimal::from(100),
            max_foreign_amount: Decimal::from(50_000),
            approval_ratio: 0.8,
            end_date: Utc::now().date_naive(),
            span_days: 90,
        }
    }
}

/// Generate a random book using the thread-local RNG.
pub fn generate_random_book(config: &BookConfig) -> Book {
    generate_random_book_with_rng(config, &mut rand::thread_rng())
}

/// Generate a random book from the given RNG, for reproducible output.
pub fn generate_random_book_with_rng<G: Rng>(config: &BookConfig, rng: &mut G) -> Book {
    let mut book = Book::new();
    let min_foreign: f64 = config.min_foreign_amount.to_string().parse().unwrap_or(100.0);
    let max_foreign: f64 = config.max_foreign_amount.to_string().parse().unwrap_or(50_000.0);
    let max_foreign = max_foreign.max(min_foreign + 1.0);
    let base_rate: f64 = config.base_rate.to_string().parse().unwrap_or(120.0);
    let jitter = config.rate_jitter.abs();

    for i in 0..config.counterparty_count {
        let id = format!("SUP-{:04}", i);
        book.counterparties
            .push(Counterparty::new(id.clone(), format!("Supplier {:04}", i)));

        for _ in 0..config.forex_per_counterparty {
            let foreign = random_amount(rng, min_foreign, max_foreign);
            let rate = base_rate * (1.0 + rng.gen_range(-jitter..=jitter));
            let rate = Decimal::from_f64_retain(rate)
                .map(|r| r.round_dp(4))
                .unwrap_or(config.base_rate);
            let local = (foreign * rate).round_dp(2);
            let status = if rng.gen_bool(config.approval_ratio.clamp(0.0, 1.0)) {
                ForexStatus::Approved
            } else if rng.gen_bool(0.5) {
                ForexStatus::Pending
            } else {
                ForexStatus::Rejected
            };
            let occurred_at = random_date(rng, config);
            let recorded_at = occurred_at
                .and_hms_opt(12, 0, 0)
                .map(|noon| Utc.from_utc_datetime(&noon))
                .unwrap_or_else(Utc::now);

            book.forex.push(
                ForexRecord::new(id.clone(), foreign, local, occurred_at)
                    .with_status(status)
                    .with_recorded_at(recorded_at),
            );
        }

        for _ in 0..config.payments_per_counterparty {
            let local = (random_amount(rng, min_foreign, max_foreign) * config.base_rate
                / Decimal::from(2))
            .round_dp(2);
            book.payments
                .push(PaymentRecord::new(id.clone(), local, random_date(rng, config)));
        }

        for n in 0..config.invoices_per_counterparty {
            let amount = (random_amount(rng, min_foreign, max_foreign) * config.base_rate).round_dp(2);
            book.invoices.push(InvoiceRecord::new(
                id.clone(),
                format!("INV-{:04}-{:03}", i, n),
                amount,
                random_date(rng, config),
            ));
        }
    }

    book
}

fn random_amount<G: Rng>(rng: &mut G, min: f64, max: f64) -> Decimal {
    let amount = rng.gen_range(min..max);
    Decimal::from_f64_retain(amount)
        .unwrap_or(Decimal::ONE_HUNDRED)
        .round_dp(2)
        .max(Decimal::new(1, 2))
}

fn random_date<G: Rng>(rng: &mut G, config: &BookConfig) -> NaiveDate {
    let back = rng.gen_range(0..=config.span_days);
    config.end_date - Duration::days(i64::from(back))
}
