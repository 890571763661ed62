// Rust guideline compliant 2026-10-18

//! Accumulating forecast cache keyed by configuration id.
//!
//! Records every forecast point produced for a device across all chart
//! requests of the process, for later cross-request aggregate queries. The
//! cache is an owned value: callers share it through an `Arc` and inject it
//! where needed.
//!
//! Backed by `DashMap`: a write locks the shard holding the id, so writes
//! for the same id are serialized while writes for other ids proceed in
//! parallel. Writes are not idempotent under [`WritePolicy::Append`] and must
//! never be retried.

use dashmap::DashMap;
use domain::{ConfigId, ForecastPoint};

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Errors raised while configuring the cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The supplied configuration is invalid.
    #[error("invalid cache configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ForecastCacheConfig + builder
// ---------------------------------------------------------------------------

/// How a write merges with the points already held for an id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Append every point; forecasting the same id twice records it twice.
    #[default]
    Append,
    /// Key on (id, date): replace the price of an existing date, insert new
    /// dates in ascending order.
    Upsert,
}

/// Runtime configuration for a [`ForecastCache`].
///
/// Construct via [`ForecastCacheConfig::builder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastCacheConfig {
    /// Merge rule for writes.
    pub write_policy: WritePolicy,
    /// Optional retention bound per id; the oldest points are dropped first.
    /// `None` keeps every point for the lifetime of the cache.
    pub max_points_per_id: Option<usize>,
}

/// Builder for [`ForecastCacheConfig`].
///
/// Obtain via [`ForecastCacheConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct ForecastCacheConfigBuilder {
    write_policy: WritePolicy,
    max_points_per_id: Option<usize>,
}

impl ForecastCacheConfig {
    /// Create a builder.
    ///
    /// Default values: `write_policy = Append`, `max_points_per_id = None`.
    #[must_use]
    pub fn builder() -> ForecastCacheConfigBuilder {
        ForecastCacheConfigBuilder { write_policy: WritePolicy::Append, max_points_per_id: None }
    }
}

impl ForecastCacheConfigBuilder {
    /// Select the merge rule.
    #[must_use]
    pub fn write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Keep at most `n` points per id.
    #[must_use]
    pub fn max_points_per_id(mut self, n: usize) -> Self {
        self.max_points_per_id = Some(n);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] when `max_points_per_id` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ForecastCacheConfig, CacheError> {
        if self.max_points_per_id == Some(0) {
            return Err(CacheError::InvalidConfig {
                reason: "max_points_per_id must be >= 1".to_owned(),
            });
        }
        Ok(ForecastCacheConfig {
            write_policy: self.write_policy,
            max_points_per_id: self.max_points_per_id,
        })
    }
}

// ---------------------------------------------------------------------------
// ForecastCache
// ---------------------------------------------------------------------------

/// Process-wide store: id -> forecast points observed across all requests.
#[derive(Debug, Default)]
pub struct ForecastCache {
    entries: DashMap<ConfigId, Vec<ForecastPoint>>,
    config: ForecastCacheConfig,
}

impl ForecastCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(config: ForecastCacheConfig) -> Self {
        Self { entries: DashMap::new(), config }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ForecastCacheConfig {
        &self.config
    }

    /// Record one point for `id`.
    pub fn record(&self, id: ConfigId, point: ForecastPoint) {
        self.record_all(id, std::slice::from_ref(&point));
    }

    /// Record `points` for `id` as one write.
    ///
    /// The entry stays locked for the whole batch, so the points of one
    /// forecast are never interleaved with a concurrent write for the same id.
    pub fn record_all(&self, id: ConfigId, points: &[ForecastPoint]) {
        let mut entry = self.entries.entry(id).or_default();
        match self.config.write_policy {
            WritePolicy::Append => entry.extend_from_slice(points),
            WritePolicy::Upsert => {
                for point in points {
                    match entry.binary_search_by_key(&point.date, |p| p.date) {
                        Ok(i) => entry[i] = *point,
                        Err(i) => entry.insert(i, *point),
                    }
                }
            }
        }
        if let Some(max) = self.config.max_points_per_id
            && entry.len() > max
        {
            let excess = entry.len() - max;
            entry.rotate_left(excess);
            entry.truncate(max);
            tracing::debug!(%id, dropped = excess, "forecast_cache.retention.trimmed");
        }
        tracing::debug!(
            %id,
            recorded = points.len(),
            total = entry.len(),
            "forecast_cache.recorded"
        );
    }

    /// Copy of every point recorded for `id`, oldest write first.
    ///
    /// Returns an empty vector for an id never recorded.
    #[must_use]
    pub fn snapshot(&self, id: ConfigId) -> Vec<ForecastPoint> {
        self.entries.get(&id).map(|e| e.value().clone()).unwrap_or_default()
    }

    /// Number of points recorded for `id`.
    #[must_use]
    pub fn len(&self, id: ConfigId) -> usize {
        self.entries.get(&id).map_or(0, |e| e.len())
    }

    /// `true` when `id` has at least one point.
    #[must_use]
    pub fn contains(&self, id: ConfigId) -> bool {
        self.len(id) > 0
    }

    /// Ids with recorded points, ascending.
    #[must_use]
    pub fn ids(&self) -> Vec<ConfigId> {
        let mut ids: Vec<ConfigId> = self.entries.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Points recorded across all ids.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.entries.iter().map(|e| e.len()).sum()
    }

    /// `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
