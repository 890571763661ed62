// Rust guideline compliant 2026-10-18

//! Chart orchestration -- turns selected configuration ids into chart series.
//!
//! Entry points: [`ChartService::build_charts`],
//! [`ChartService::filter_forecastable`], [`ChartService::set_selection`],
//! and the error-accumulating [`ChartSession`]. Configuration via
//! [`ChartServiceConfig::builder`].
//!
//! One request runs eligibility filtering first, then fans out over the
//! accepted ids with bounded concurrency: resolve, forecast, record the
//! points in the shared forecast cache, assemble the series. A failure for
//! one id is reported next to the series of the others.

mod assembler;
mod service;
mod session;

#[cfg(test)]
mod test_support;

pub use assembler::ChartAssembler;
pub use service::{ChartReport, ChartService};
pub use session::ChartSession;

// ---------------------------------------------------------------------------
// ChartingError
// ---------------------------------------------------------------------------

/// Errors raised while configuring the chart service.
#[derive(Debug, thiserror::Error)]
pub enum ChartingError {
    /// The supplied configuration is invalid.
    #[error("invalid chart service configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ChartServiceConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`ChartService`].
///
/// Construct via [`ChartServiceConfig::builder`].
#[derive(Debug, Clone, Copy)]
pub struct ChartServiceConfig {
    /// Maximum number of ids forecast at the same time within one request.
    pub max_concurrency: usize,
    /// Style flag copied into every series.
    pub fill: bool,
    /// Line width copied into every series.
    pub border_width: u32,
}

/// Builder for [`ChartServiceConfig`].
///
/// Obtain via [`ChartServiceConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct ChartServiceConfigBuilder {
    max_concurrency: usize,
    fill: bool,
    border_width: u32,
}

impl ChartServiceConfig {
    /// Create a builder.
    ///
    /// Default values: `max_concurrency = 4`, `fill = false`, `border_width = 1`.
    #[must_use]
    pub fn builder() -> ChartServiceConfigBuilder {
        ChartServiceConfigBuilder { max_concurrency: 4, fill: false, border_width: 1 }
    }
}

impl Default for ChartServiceConfig {
    fn default() -> Self {
        Self { max_concurrency: 4, fill: false, border_width: 1 }
    }
}

impl ChartServiceConfigBuilder {
    /// Override the per-request fan-out limit.
    #[must_use]
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }

    /// Fill the area under every series.
    #[must_use]
    pub fn fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Override the line width of every series.
    #[must_use]
    pub fn border_width(mut self, width: u32) -> Self {
        self.border_width = width;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChartingError::InvalidConfig`] when `max_concurrency` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ChartServiceConfig, ChartingError> {
        if self.max_concurrency == 0 {
            return Err(ChartingError::InvalidConfig {
                reason: "max_concurrency must be >= 1".to_owned(),
            });
        }
        Ok(ChartServiceConfig {
            max_concurrency: self.max_concurrency,
            fill: self.fill,
            border_width: self.border_width,
        })
    }
}
