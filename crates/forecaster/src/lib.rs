// Rust guideline compliant 2026-10-18

//! Forecast adapter for the price-forecast pipeline.
//!
//! [`ForecastAdapter`] wraps an injected `domain::ForecastEngine` and owns
//! everything around the engine call: the forecast horizon, the time box,
//! the bounded retry, and validation of the engine output. It carries no
//! statistical logic.

use domain::{
    Brand, DEFAULT_HORIZON_MONTHS, ForecastEngine, ForecastError, ForecastPoint, RetryPolicy,
    TransactionHistory,
};
use std::time::Duration;

/// Longest horizon accepted by [`ForecasterConfigBuilder::build`] (ten years).
const MAX_HORIZON_MONTHS: u32 = 120;

// ---------------------------------------------------------------------------
// ForecasterError
// ---------------------------------------------------------------------------

/// Errors raised while configuring the forecast adapter.
#[derive(Debug, thiserror::Error)]
pub enum ForecasterError {
    /// The supplied configuration is invalid.
    #[error("invalid forecaster configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ForecasterConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`ForecastAdapter`].
///
/// Construct via [`ForecasterConfig::builder`].
#[derive(Debug, Clone, Copy)]
pub struct ForecasterConfig {
    /// Number of monthly periods to forecast (range: `[1, 120]`).
    pub horizon_months: u32,
    /// Time box for one engine attempt.
    pub timeout: Duration,
    /// Retry policy applied around the engine call.
    pub retry: RetryPolicy,
}

/// Builder for [`ForecasterConfig`].
///
/// Obtain via [`ForecasterConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct ForecasterConfigBuilder {
    horizon_months: u32,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ForecasterConfig {
    /// Create a builder. `horizon_months` is the only required parameter.
    ///
    /// Default values: `timeout = 5 s`, `max_retries = 0`, `retry_backoff = 100 ms`.
    #[must_use]
    pub fn builder(horizon_months: u32) -> ForecasterConfigBuilder {
        ForecasterConfigBuilder {
            horizon_months,
            timeout: Duration::from_secs(5),
            max_retries: 0,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::none(),
        }
    }
}

impl ForecasterConfigBuilder {
    /// Override the per-attempt time box.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allow up to `n` retries of a failed or timed-out engine call.
    #[must_use]
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Override the delay between two engine attempts.
    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ForecasterError::InvalidConfig`] when `horizon_months` is
    /// outside `[1, 120]` or `timeout` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ForecasterConfig, ForecasterError> {
        if !horizon_in_range(self.horizon_months) {
            return Err(ForecasterError::InvalidConfig {
                reason: format!("horizon_months must be in [1, {MAX_HORIZON_MONTHS}]"),
            });
        }
        if self.timeout.is_zero() {
            return Err(ForecasterError::InvalidConfig {
                reason: "timeout must be > 0".to_owned(),
            });
        }
        Ok(ForecasterConfig {
            horizon_months: self.horizon_months,
            timeout: self.timeout,
            retry: RetryPolicy::new(self.max_retries, self.retry_backoff),
        })
    }
}

// ---------------------------------------------------------------------------
// ForecastAdapter
// ---------------------------------------------------------------------------

/// Runs the forecasting engine for one device at a time.
///
/// Generic over any `ForecastEngine` adapter. The configured horizon is the
/// only horizon used by [`forecast`](Self::forecast), so the value shown to
/// callers and the value given to the engine cannot drift apart.
#[derive(Debug)]
pub struct ForecastAdapter<E: ForecastEngine> {
    engine: E,
    config: ForecasterConfig,
}

impl<E: ForecastEngine> ForecastAdapter<E> {
    /// Create an adapter wrapping `engine`.
    #[must_use]
    pub fn new(engine: E, config: ForecasterConfig) -> Self {
        Self { engine, config }
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Configured forecast horizon, in months.
    #[must_use]
    pub fn horizon_months(&self) -> u32 {
        self.config.horizon_months
    }

    /// Forecast `brand`/`model` over the configured horizon.
    ///
    /// # Errors
    ///
    /// See [`forecast_with_horizon`](Self::forecast_with_horizon).
    pub async fn forecast(
        &self,
        history: &TransactionHistory,
        brand: Brand,
        model: &str,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        self.forecast_with_horizon(history, brand, model, self.config.horizon_months).await
    }

    /// Forecast `brand`/`model` over `horizon_months` months.
    ///
    /// Each engine attempt is bounded by `config.timeout`; failed or timed-out
    /// attempts are retried per `config.retry`. The result holds exactly
    /// `horizon_months` points with strictly ascending dates and finite,
    /// non-negative prices.
    ///
    /// # Errors
    ///
    /// Returns `ForecastError::InvalidHorizon` when `horizon_months` is
    /// outside `[1, 120]` (the engine is not called),
    /// `ForecastError::ComputationFailed` when the engine fails,
    /// `ForecastError::TimedOut` when the last attempt exceeds the time box,
    /// and `ForecastError::InvalidOutput` when the output breaks the contract
    /// above.
    pub async fn forecast_with_horizon(
        &self,
        history: &TransactionHistory,
        brand: Brand,
        model: &str,
        horizon_months: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        if !horizon_in_range(horizon_months) {
            return Err(ForecastError::InvalidHorizon { months: horizon_months });
        }
        let timeout = self.config.timeout;
        let points = self
            .config
            .retry
            .run("engine.generate_future_forecast", is_retryable, || async move {
                let call =
                    self.engine.generate_future_forecast(history, brand, model, horizon_months);
                match tokio::time::timeout(timeout, call).await {
                    Ok(result) => result,
                    Err(_elapsed) => Err(ForecastError::TimedOut { after: timeout }),
                }
            })
            .await?;

        validate(&points, horizon_months)?;
        tracing::debug!(%brand, model, points = points.len(), "forecaster.forecast.done");
        Ok(points)
    }
}

fn horizon_in_range(months: u32) -> bool {
    (1..=MAX_HORIZON_MONTHS).contains(&months)
}

/// Engine-reported `InvalidOutput` is not retried. Output rejected by
/// `validate` never reaches this check: validation runs once, after the
/// retry loop.
fn is_retryable(error: &ForecastError) -> bool {
    !matches!(error, ForecastError::InvalidOutput { .. })
}

/// Check point count, date order, and price range of an engine answer.
fn validate(points: &[ForecastPoint], horizon_months: u32) -> Result<(), ForecastError> {
    if points.len() != horizon_months as usize {
        return Err(ForecastError::InvalidOutput {
            reason: format!("{} points, expected {horizon_months}", points.len()),
        });
    }
    if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
        return Err(ForecastError::InvalidOutput {
            reason: format!("dates not ascending: {} then {}", pair[0].date, pair[1].date),
        });
    }
    if let Some(bad) = points.iter().find(|p| !p.has_valid_price()) {
        return Err(ForecastError::InvalidOutput {
            reason: format!("invalid price {} on {}", bad.price, bad.date),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
