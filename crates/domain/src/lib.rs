// Rust guideline compliant 2026-10-18

//! Shared domain types for the device price-forecast workspace.
//!
//! Defines the catalog and forecast value types, the per-id [`ChartError`],
//! the [`RetryPolicy`] used around external calls, and the hexagonal port
//! traits: [`CatalogSource`], [`Auditor`], and [`ForecastEngine`].
//! All component crates depend on this crate.

mod retry;

pub use retry::RetryPolicy;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Forecast horizon applied when no other value is configured.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// Stable identifier of one hardware configuration in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(pub u32);

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ConfigId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Phone manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brand {
    Apple,
    Samsung,
    Google,
    Huawei,
    Xiaomi,
    OnePlus,
    Motorola,
    Nokia,
    Sony,
}

impl Brand {
    /// Every brand, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Apple,
        Self::Samsung,
        Self::Google,
        Self::Huawei,
        Self::Xiaomi,
        Self::OnePlus,
        Self::Motorola,
        Self::Nokia,
        Self::Sony,
    ];

    /// Display name, identical to the variant name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apple => "Apple",
            Self::Samsung => "Samsung",
            Self::Google => "Google",
            Self::Huawei => "Huawei",
            Self::Xiaomi => "Xiaomi",
            Self::OnePlus => "OnePlus",
            Self::Motorola => "Motorola",
            Self::Nokia => "Nokia",
            Self::Sony => "Sony",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable device name, `"{brand} {model}"`.
///
/// Used both as the chart series label and as the prefix of per-device
/// error messages.
#[must_use]
pub fn device_label(brand: Brand, model: &str) -> String {
    format!("{brand} {model}")
}

/// One entry of the hardware catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareConfiguration {
    /// Unique, stable identifier.
    pub id: ConfigId,
    /// Manufacturer.
    pub brand: Brand,
    /// Model name (e.g. `"Galaxy S21"`).
    pub model: String,
    /// Whether the configuration is part of the current selection.
    pub is_selected: bool,
}

impl HardwareConfiguration {
    /// Create an unselected catalog entry.
    #[must_use]
    pub fn new(id: ConfigId, brand: Brand, model: impl Into<String>) -> Self {
        Self { id, brand, model: model.into(), is_selected: false }
    }

    /// `"{brand} {model}"`.
    #[must_use]
    pub fn label(&self) -> String {
        device_label(self.brand, &self.model)
    }
}

// ---------------------------------------------------------------------------
// Transaction history
// ---------------------------------------------------------------------------

/// A single historical purchase observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Manufacturer of the device sold.
    pub brand: Brand,
    /// Model of the device sold.
    pub model: String,
    /// Purchase date.
    pub date: NaiveDate,
    /// Purchase price.
    pub price: f64,
}

/// Read-only list of historical observations for every device.
///
/// Supplied by a [`CatalogSource`]; consumed by the [`Auditor`] and the
/// [`ForecastEngine`], which select the rows for one (brand, model) pair via
/// [`for_device`](Self::for_device).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionHistory {
    transactions: Vec<Transaction>,
}

impl TransactionHistory {
    /// Wrap an existing list of observations.
    #[must_use]
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// All observations, in insertion order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Observations recorded for one (brand, model) pair.
    pub fn for_device<'a>(
        &'a self,
        brand: Brand,
        model: &'a str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |t| t.brand == brand && t.model == model)
    }

    /// Number of observations recorded for one (brand, model) pair.
    #[must_use]
    pub fn count_for(&self, brand: Brand, model: &str) -> usize {
        self.for_device(brand, model).count()
    }

    /// Total number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// `true` when no observation is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl FromIterator<Transaction> for TransactionHistory {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self { transactions: iter.into_iter().collect() }
    }
}

// ---------------------------------------------------------------------------
// Forecast output
// ---------------------------------------------------------------------------

/// One predicted price for one forecast period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// First day of the forecast period.
    pub date: NaiveDate,
    /// Engine point estimate; finite and non-negative once validated.
    pub price: f64,
}

impl ForecastPoint {
    /// Create a point.
    #[must_use]
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// `true` when the price is finite and not negative.
    #[must_use]
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }
}

/// One device's forecast trajectory, ready for a chart widget.
///
/// Serializes as `{ "label", "fill", "borderWidth", "data" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// `"{brand} {model}"`.
    pub label: String,
    /// Whether the area under the line is filled.
    pub fill: bool,
    /// Line width in pixels.
    pub border_width: u32,
    /// Forecast points in ascending date order.
    #[serde(rename = "data")]
    pub points: Vec<ForecastPoint>,
}

impl ChartSeries {
    /// Number of points in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when the series holds no point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the catalog and the [`CatalogSource`] port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The id is not present in the catalog.
    #[error("unknown configuration id {id}")]
    UnknownConfiguration { id: ConfigId },
    /// The same id appears more than once in the loaded catalog.
    #[error("duplicate configuration id {id}")]
    DuplicateConfiguration { id: ConfigId },
    /// The catalog source could not be read.
    #[error("catalog source unavailable: {reason}")]
    SourceUnavailable {
        /// Human-readable description.
        reason: String,
    },
}

/// Errors from the [`Auditor`] port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// The sufficiency check could not be completed.
    #[error("audit unavailable: {reason}")]
    Unavailable {
        /// Human-readable description.
        reason: String,
    },
}

/// Errors from the [`ForecastEngine`] port and the forecast adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForecastError {
    /// The engine could not produce a forecast.
    #[error("forecast computation failed: {reason}")]
    ComputationFailed {
        /// Human-readable description.
        reason: String,
    },
    /// The engine did not answer within the configured time box.
    #[error("forecast timed out after {after:?}")]
    TimedOut { after: Duration },
    /// The engine answered, but the output breaks the forecast contract.
    #[error("invalid forecast output: {reason}")]
    InvalidOutput {
        /// Human-readable description.
        reason: String,
    },
    /// The requested horizon is outside the supported range.
    #[error("forecast horizon of {months} months is out of range")]
    InvalidHorizon { months: u32 },
}

/// Per-id failure of one chart-build request.
///
/// A failure for one id never prevents processing of the other ids of the
/// same request. The `Display` text is what lands in the caller-visible
/// error log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    /// The id is not present in the catalog.
    #[error("unknown configuration id {id}")]
    UnknownConfiguration { id: ConfigId },
    /// Not enough historical transactions to forecast the device.
    #[error("{brand} {model} - Not Enough Transactions")]
    InsufficientData { id: ConfigId, brand: Brand, model: String },
    /// The sufficiency check itself failed.
    #[error("{brand} {model} - {source}")]
    AuditUnavailable {
        id: ConfigId,
        brand: Brand,
        model: String,
        source: AuditError,
    },
    /// The engine failed, timed out, or returned unusable output.
    #[error("{brand} {model} - {source}")]
    ForecastComputation {
        id: ConfigId,
        brand: Brand,
        model: String,
        source: ForecastError,
    },
}

impl ChartError {
    /// The configuration the failure belongs to.
    #[must_use]
    pub fn id(&self) -> ConfigId {
        match self {
            Self::UnknownConfiguration { id }
            | Self::InsufficientData { id, .. }
            | Self::AuditUnavailable { id, .. }
            | Self::ForecastComputation { id, .. } => *id,
        }
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Hexagonal port: supplier of the catalog and its transaction history.
///
/// Called once per catalog load; the catalog crate builds its id index from
/// the returned entries.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait CatalogSource {
    /// Load every hardware configuration.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SourceUnavailable` when the source cannot be read.
    async fn load_configurations(&self) -> Result<Vec<HardwareConfiguration>, CatalogError>;

    /// Load the historical observations for all configurations.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SourceUnavailable` when the source cannot be read.
    async fn load_history(&self) -> Result<TransactionHistory, CatalogError>;
}

/// Hexagonal port: data sufficiency rule.
///
/// Decides whether a (brand, model) pair has enough historical transactions
/// to produce a trustworthy forecast. Must be deterministic for a given
/// history.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Auditor {
    /// `Ok(true)` when `history` holds enough data for `brand`/`model`.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Unavailable` when the check cannot be completed.
    async fn has_enough_transactions(
        &self,
        history: &TransactionHistory,
        brand: Brand,
        model: &str,
    ) -> Result<bool, AuditError>;
}

/// Hexagonal port: time-series forecasting engine.
///
/// The forecast adapter depends exclusively on this trait; the statistical
/// model lives entirely in the implementation.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait ForecastEngine {
    /// Predict one price per month for the next `horizon_months` months.
    ///
    /// Implementations return points in ascending date order.
    ///
    /// # Errors
    ///
    /// Returns `ForecastError::ComputationFailed` when no forecast can be
    /// produced for the device.
    async fn generate_future_forecast(
        &self,
        history: &TransactionHistory,
        brand: Brand,
        model: &str,
        horizon_months: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError>;
}
