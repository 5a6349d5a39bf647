//! # reconciliation-engine
//!
//! Financial reconciliation and liquidity forecasting for a business that
//! receives foreign-currency inflows and settles suppliers in local currency.
//!
//! Two independent transaction streams (approved forex inflows, each creating
//! a local-currency liability, and supplier payments settling it) are folded
//! into per-counterparty running balances, global portfolio metrics, and a
//! forward cash-flow projection.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: counterparties, transaction records, ledgers
//! - **analytics** — Ledger aggregation, rate estimation, portfolio metrics,
//!   liquidity forecasting, activity feed
//! - **repository** — Data source seam and an in-memory implementation
//! - **engine** — Facade that fetches, aggregates, and projects per request
//! - **simulation** — Random book generation for benchmarks and demos

pub mod analytics;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod repository;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analytics::aggregator::build_ledgers;
    pub use crate::analytics::forecast::{Forecast, ForecastPoint};
    pub use crate::analytics::metrics::{compute_portfolio_metrics, PortfolioMetrics};
    pub use crate::config::EngineConfig;
    pub use crate::core::counterparty::{Counterparty, CounterpartyId};
    pub use crate::core::ledger::{CounterpartyLedger, LedgerBook};
    pub use crate::core::transaction::{ForexRecord, ForexStatus, InvoiceRecord, PaymentRecord};
    pub use crate::engine::{PortfolioSnapshot, ReconciliationEngine};
    pub use crate::error::{EngineError, Result};
    pub use crate::repository::memory::{Book, InMemoryRepository};
    pub use crate::repository::TransactionRepository;
}
