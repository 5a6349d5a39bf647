//! The reconciliation engine facade.
//!
//! Each operation fetches a fresh snapshot of records from the repository,
//! runs it through the aggregation pipeline, and returns derived figures.
//! Independent fetches are issued concurrently and joined before any
//! aggregation starts; the first failing fetch aborts the computation.
//!
//! ```text
//! repository ──► aggregator ──► rate estimator ──► forecaster
//!                    └────────► portfolio metrics ──┘
//! ```

use crate::analytics::activity::{summarize, ActivityItem};
use crate::analytics::aggregator::{build_ledgers, build_ledgers_with_roster};
use crate::analytics::dues::{counterparties_with_due, CounterpartyDue};
use crate::analytics::forecast::Forecast;
use crate::analytics::metrics::{compute_portfolio_metrics, PortfolioMetrics};
use crate::analytics::rate::TrailingWindow;
use crate::config::EngineConfig;
use crate::core::counterparty::{Counterparty, CounterpartyId};
use crate::core::ledger::{CounterpartyLedger, LedgerBook};
use crate::core::transaction::{ForexRecord, ForexStatus};
use crate::error::{EngineError, Result};
use crate::repository::{RepositoryError, TransactionRepository};
use chrono::{NaiveDate, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Portfolio metrics together with the ledgers they were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub as_of: NaiveDate,
    pub metrics: PortfolioMetrics,
    pub ledgers: BTreeMap<CounterpartyId, CounterpartyLedger>,
    /// Malformed records left out of the totals.
    pub skipped_records: usize,
}

impl std::fmt::Display for PortfolioSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "As of {}", self.as_of)?;
        write!(f, "{}", self.metrics)?;
        if self.skipped_records > 0 {
            writeln!(f, "Skipped Records:    {}", self.skipped_records)?;
        }

        writeln!(f, "\nCounterparty Ledgers:")?;
        for ledger in self.ledgers.values() {
            let status = if ledger.is_payable() {
                "PAYABLE"
            } else if ledger.is_advance() {
                "ADVANCE"
            } else {
                "SETTLED"
            };
            writeln!(
                f,
                "  {:<15} {:>18} @ {:<10} [{}]",
                ledger.counterparty_id.to_string(),
                ledger.net_local_due.round_dp(2).to_string(),
                ledger.effective_rate.round_dp(4).to_string(),
                status
            )?;
        }
        Ok(())
    }
}

/// Records fetched for one computation.
struct Inputs {
    forex: Vec<ForexRecord>,
    book: LedgerBook,
    roster: Vec<Counterparty>,
}

/// Read-only reconciliation and forecasting over a transaction repository.
///
/// Holds no mutable state: every call re-fetches and re-aggregates, so
/// concurrent calls are fully independent.
pub struct ReconciliationEngine<R> {
    repository: R,
    config: EngineConfig,
    as_of: Option<NaiveDate>,
}

impl<R: TransactionRepository> ReconciliationEngine<R> {
    pub fn new(repository: R, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            as_of: None,
        })
    }

    /// Pin the engine's notion of "today". Defaults to the current UTC date.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Global metrics plus every counterparty ledger.
    pub async fn get_portfolio_snapshot(&self) -> Result<PortfolioSnapshot> {
        let inputs = self
            .fetch_inputs(self.config.include_idle_counterparties)
            .await?;
        let metrics = compute_portfolio_metrics(&inputs.book);
        info!(
            "portfolio snapshot: {} counterparties, net due {}",
            metrics.counterparty_count, metrics.net_portfolio_due
        );
        Ok(PortfolioSnapshot {
            as_of: self.as_of(),
            metrics,
            skipped_records: inputs.book.skipped_records(),
            ledgers: inputs.book.into_ledgers(),
        })
    }

    /// Project liquidity `horizon_days` ahead from today's payables and the
    /// trailing inflow velocity and rate.
    pub async fn get_forecast(&self, horizon_days: u32) -> Result<Forecast> {
        let inputs = self.fetch_inputs(false).await?;
        let as_of = self.as_of();
        let metrics = compute_portfolio_metrics(&inputs.book);
        let window =
            TrailingWindow::from_history(&inputs.forex, as_of, self.config.trailing_window_days);

        let forecast = Forecast::project(
            as_of,
            horizon_days,
            metrics.total_payables,
            window.rate(self.config.fallback_rate),
            window.daily_foreign_inflow(),
        );
        info!(
            "forecast: {} days from {}, {} in-window records over {} active days",
            horizon_days, as_of, window.record_count, window.active_days
        );
        Ok(forecast)
    }

    /// Forecast over the configured default horizon.
    pub async fn get_default_forecast(&self) -> Result<Forecast> {
        self.get_forecast(self.config.default_horizon_days).await
    }

    /// The ledger of a single counterparty.
    ///
    /// A counterparty on the roster with no activity gets a zero ledger;
    /// an ID that is neither active nor on the roster is an error.
    pub async fn get_counterparty_due(&self, counterparty: &CounterpartyId) -> Result<CounterpartyLedger> {
        let inputs = self.fetch_inputs(true).await?;
        if let Some(ledger) = inputs.book.get(counterparty) {
            return Ok(ledger.clone());
        }

        if inputs.roster.iter().any(|c| &c.id == counterparty) {
            Ok(CounterpartyLedger::new(
                counterparty.clone(),
                self.config.fallback_rate,
            ))
        } else {
            Err(EngineError::UnknownCounterparty(counterparty.clone()))
        }
    }

    /// Counterparties with a non-zero net due, largest payable first.
    pub async fn get_counterparties_with_due(&self) -> Result<Vec<CounterpartyDue>> {
        let inputs = self.fetch_inputs(true).await?;
        Ok(counterparties_with_due(&inputs.roster, &inputs.book))
    }

    /// Recent forex, payment, and invoice activity, newest first.
    /// Forex records of every status are listed.
    pub async fn get_activity(&self, limit: usize) -> Result<Vec<ActivityItem>> {
        let (forex, payments, invoices) = futures::try_join!(
            self.repository.fetch_forex(None, None),
            self.repository.fetch_payments(None),
            self.repository.fetch_invoices(None),
        )
        .map_err(log_fetch_failure)?;
        Ok(summarize(&forex, &payments, &invoices, limit))
    }

    async fn fetch_inputs(&self, with_roster: bool) -> Result<Inputs> {
        let roster = async {
            if with_roster {
                self.repository.fetch_counterparties().await
            } else {
                Ok(Vec::new())
            }
        };
        let (forex, payments, roster) = futures::try_join!(
            self.repository.fetch_forex(Some(ForexStatus::Approved), None),
            self.repository.fetch_payments(None),
            roster,
        )
        .map_err(log_fetch_failure)?;

        let book = if self.config.include_idle_counterparties {
            build_ledgers_with_roster(&roster, &forex, &payments, self.config.fallback_rate)
        } else {
            build_ledgers(&forex, &payments, self.config.fallback_rate)
        };
        Ok(Inputs {
            forex,
            book,
            roster,
        })
    }
}

fn log_fetch_failure(e: RepositoryError) -> RepositoryError {
    error!("repository fetch failed: {}", e);
    e
}
