// Rust guideline compliant 2026-10-18

//! Linear-trend adapter for the `ForecastEngine` port.
//!
//! Averages the observed prices per calendar month, fits a least-squares
//! line through the monthly averages and extends it month by month after the
//! last observed month. Projected prices are clamped at zero.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use domain::{Brand, ForecastEngine, ForecastError, ForecastPoint, TransactionHistory};

/// Concrete adapter for the `domain::ForecastEngine` port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTrendEngine;

impl LinearTrendEngine {
    /// Create the engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ForecastEngine for LinearTrendEngine {
    /// # Errors
    ///
    /// Returns `ForecastError::ComputationFailed` when the device has no
    /// observations or the projection leaves the calendar range.
    async fn generate_future_forecast(
        &self,
        history: &TransactionHistory,
        brand: Brand,
        model: &str,
        horizon_months: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let averages = monthly_averages(history, brand, model);
        let Some(&last_month) = averages.keys().next_back() else {
            return Err(ForecastError::ComputationFailed {
                reason: format!("no transactions for {brand} {model}"),
            });
        };

        let (slope, intercept) = fit(&averages);
        let points = (1..=horizon_months)
            .map(|step| {
                let month = last_month + i64::from(step);
                let price = (intercept + slope * month_f64(month)).max(0.0);
                first_of_month(month).map(|date| ForecastPoint::new(date, price))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(%brand, model, months = averages.len(), slope, "linear_trend.fit");
        Ok(points)
    }
}

/// Mean price per absolute month index (`year * 12 + month0`).
fn monthly_averages(history: &TransactionHistory, brand: Brand, model: &str) -> BTreeMap<i64, f64> {
    let mut sums: BTreeMap<i64, (f64, u32)> = BTreeMap::new();
    for tx in history.for_device(brand, model) {
        let slot = sums.entry(month_index(tx.date)).or_insert((0.0, 0));
        slot.0 += tx.price;
        slot.1 += 1;
    }
    sums.into_iter().map(|(month, (sum, n))| (month, sum / f64::from(n))).collect()
}

/// Least-squares `(slope, intercept)`; a single month gives a flat line.
#[expect(clippy::cast_precision_loss, reason = "a history never spans 2^52 months")]
fn fit(averages: &BTreeMap<i64, f64>) -> (f64, f64) {
    let n = averages.len() as f64;
    let mean_x = averages.keys().map(|&x| month_f64(x)).sum::<f64>() / n;
    let mean_y = averages.values().sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (&x, &y) in averages {
        let dx = month_f64(x) - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (slope, mean_y - slope * mean_x)
}

#[expect(clippy::cast_precision_loss, reason = "month indices stay far below 2^52")]
fn month_f64(index: i64) -> f64 {
    index as f64
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn first_of_month(index: i64) -> Result<NaiveDate, ForecastError> {
    let year = i32::try_from(index.div_euclid(12)).ok();
    let month = u32::try_from(index.rem_euclid(12)).ok().map(|m| m + 1);
    year.zip(month)
        .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1))
        .ok_or_else(|| ForecastError::ComputationFailed {
            reason: format!("month index {index} out of calendar range"),
        })
}
