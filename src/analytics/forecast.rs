//! Liquidity forecasting.
//!
//! Projects daily foreign inflow and the local liability it creates over a
//! horizon, assuming the trailing average inflow and rate stay constant.
//! This is a constant-velocity model: no seasonality and no trend fitting.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed horizon used for [`ForecastSummary::projected_30d_liability`].
pub const SUMMARY_HORIZON_DAYS: u32 = 30;

/// One projected day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub projected_foreign_inflow: Decimal,
    pub projected_local_liability_created: Decimal,
    pub cumulative_foreign_inflow: Decimal,
    /// Outstanding exposure: current payables plus all liability projected
    /// up to and including this day.
    pub cumulative_local_liability: Decimal,
}

/// Headline figures accompanying a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub current_payables: Decimal,
    pub avg_daily_inflow: Decimal,
    pub avg_rate: Decimal,
    pub projected_30d_liability: Decimal,
}

impl ForecastSummary {
    pub fn new(current_payables: Decimal, avg_daily_inflow: Decimal, avg_rate: Decimal) -> Self {
        Self {
            current_payables,
            avg_daily_inflow,
            avg_rate,
            projected_30d_liability: current_payables
                + avg_daily_inflow * avg_rate * Decimal::from(SUMMARY_HORIZON_DAYS),
        }
    }
}

/// A projected curve with its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
}

impl Forecast {
    /// Build the curve and its summary from the same inputs.
    pub fn project(
        start: NaiveDate,
        horizon_days: u32,
        current_payables: Decimal,
        trailing_rate: Decimal,
        trailing_daily_foreign_inflow: Decimal,
    ) -> Self {
        Self {
            points: forecast(
                start,
                horizon_days,
                current_payables,
                trailing_rate,
                trailing_daily_foreign_inflow,
            ),
            summary: ForecastSummary::new(
                current_payables,
                trailing_daily_foreign_inflow,
                trailing_rate,
            ),
        }
    }

    /// The last projected point.
    pub fn final_point(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}

/// Project `horizon_days + 1` daily points starting at `start`.
///
/// Day 0 already includes one day of projected inflow, and the cumulative
/// liability is seeded with `current_payables` rather than zero.
///
/// # Examples
///
/// ```
/// use reconciliation_engine::analytics::forecast::forecast;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
/// let points = forecast(start, 2, dec!(5000), dec!(120), dec!(100));
///
/// assert_eq!(points.len(), 3);
/// assert_eq!(points[0].cumulative_local_liability, dec!(17000));
/// assert_eq!(points[2].cumulative_foreign_inflow, dec!(300));
/// ```
pub fn forecast(
    start: NaiveDate,
    horizon_days: u32,
    current_payables: Decimal,
    trailing_rate: Decimal,
    trailing_daily_foreign_inflow: Decimal,
) -> Vec<ForecastPoint> {
    let daily_liability = trailing_daily_foreign_inflow * trailing_rate;
    let mut cumulative_foreign = Decimal::ZERO;
    let mut cumulative_local = current_payables;

    (0..=horizon_days)
        .map(|offset| {
            cumulative_foreign += trailing_daily_foreign_inflow;
            cumulative_local += daily_liability;
            ForecastPoint {
                date: start + Duration::days(i64::from(offset)),
                projected_foreign_inflow: trailing_daily_foreign_inflow,
                projected_local_liability_created: daily_liability,
                cumulative_foreign_inflow: cumulative_foreign,
                cumulative_local_liability: cumulative_local,
            }
        })
        .collect()
}

impl std::fmt::Display for Forecast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Liquidity Forecast ===")?;
        writeln!(f, "Current Payables:   {}", self.summary.current_payables.round_dp(2))?;
        writeln!(f, "Avg Daily Inflow:   {}", self.summary.avg_daily_inflow.round_dp(2))?;
        writeln!(f, "Avg Rate:           {}", self.summary.avg_rate.round_dp(4))?;
        writeln!(
            f,
            "30d Liability:      {}",
            self.summary.projected_30d_liability.round_dp(2)
        )?;

        writeln!(f, "\n{:<12} {:>16} {:>20}", "Date", "Cum. Foreign", "Cum. Liability")?;
        for point in &self.points {
            writeln!(
                f,
                "{:<12} {:>16} {:>20}",
                point.date.to_string(),
                point.cumulative_foreign_inflow.round_dp(2).to_string(),
                point.cumulative_local_liability.round_dp(2).to_string()
            )?;
        }
        Ok(())
    }
}
