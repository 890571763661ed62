// Rust guideline compliant 2026-10-18

//! Request orchestration: filter, then forecast and chart every accepted id.

use std::collections::HashSet;
use std::sync::Arc;

use catalog::Catalog;
use domain::{
    Auditor, ChartError, ChartSeries, ConfigId, ForecastEngine, TransactionHistory,
    device_label,
};
use eligibility::{Eligibility, EligibilityFilter, ErrorLog};
use forecast_cache::ForecastCache;
use forecaster::ForecastAdapter;
use futures::stream::{self, StreamExt};

use crate::{ChartAssembler, ChartServiceConfig, ChartSession};

// ---------------------------------------------------------------------------
// ChartReport
// ---------------------------------------------------------------------------

/// Outcome of one [`ChartService::build_charts`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartReport {
    /// One series per successfully forecast id, in request order.
    pub series: Vec<ChartSeries>,
    /// Deduplicated human-readable messages, one per distinct failure.
    pub errors: ErrorLog,
    /// Typed per-id failures, rejections first, then forecast failures.
    pub failures: Vec<ChartError>,
}

impl ChartReport {
    fn fail(&mut self, error: ChartError) {
        self.errors.push(error.to_string());
        self.failures.push(error);
    }
}

// ---------------------------------------------------------------------------
// ChartService
// ---------------------------------------------------------------------------

/// Builds price-forecast chart series for selected hardware configurations.
///
/// Generic over the `Auditor` and `ForecastEngine` ports. The catalog, the
/// history and the forecast cache are shared through `Arc` so several
/// services (or a service and its caller) can observe the same state.
#[derive(Debug)]
pub struct ChartService<A: Auditor, E: ForecastEngine> {
    config: ChartServiceConfig,
    catalog: Arc<Catalog>,
    history: Arc<TransactionHistory>,
    filter: EligibilityFilter<A>,
    forecaster: ForecastAdapter<E>,
    cache: Arc<ForecastCache>,
    assembler: ChartAssembler,
}

impl<A: Auditor, E: ForecastEngine> ChartService<A, E> {
    /// Wire a service from its collaborators.
    #[must_use]
    pub fn new(
        config: ChartServiceConfig,
        catalog: Arc<Catalog>,
        history: Arc<TransactionHistory>,
        filter: EligibilityFilter<A>,
        forecaster: ForecastAdapter<E>,
        cache: Arc<ForecastCache>,
    ) -> Self {
        let assembler = ChartAssembler::new(config.fill, config.border_width);
        Self { config, catalog, history, filter, forecaster, cache, assembler }
    }

    /// The catalog the service resolves ids against.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The forecast cache every successful forecast is recorded into.
    #[must_use]
    pub fn cache(&self) -> &Arc<ForecastCache> {
        &self.cache
    }

    /// The forecast adapter, for horizon and engine inspection.
    #[must_use]
    pub fn forecaster(&self) -> &ForecastAdapter<E> {
        &self.forecaster
    }

    /// The eligibility filter.
    #[must_use]
    pub fn filter(&self) -> &EligibilityFilter<A> {
        &self.filter
    }

    /// Start a session whose error log accumulates across calls.
    #[must_use]
    pub fn session(&self) -> ChartSession<'_, A, E> {
        ChartSession::new(self)
    }

    /// Split `ids` into forecastable ids and rejections.
    ///
    /// See [`EligibilityFilter::filter_forecastable`].
    pub async fn filter_forecastable(&self, ids: &[ConfigId]) -> Eligibility {
        self.filter.filter_forecastable(&self.catalog, &self.history, ids).await
    }

    /// Replace the selection flags of the whole catalog with `ids`.
    pub async fn set_selection(&self, ids: &[ConfigId]) {
        self.catalog.set_selection(ids).await;
    }

    /// Chart the ids currently flagged as selected in the catalog.
    pub async fn build_selected_charts(&self) -> ChartReport {
        let selected = self.catalog.selected_ids().await;
        self.build_charts(&selected).await
    }

    /// Build one series per forecastable id of `selected_ids`.
    ///
    /// Repeated ids are charted once. Ids are forecast concurrently, at most
    /// `config.max_concurrency` at a time; series keep request order. Every
    /// forecast is appended to the cache before its series is assembled, and
    /// the series holds only the fresh points. A failure for one id is
    /// reported in the returned [`ChartReport`] and never stops the others.
    pub async fn build_charts(&self, selected_ids: &[ConfigId]) -> ChartReport {
        let unique = dedup_preserving_order(selected_ids);
        let eligibility = self.filter_forecastable(&unique).await;

        let mut report = ChartReport {
            series: Vec::with_capacity(eligibility.accepted.len()),
            errors: eligibility.errors,
            failures: eligibility.rejections,
        };

        let results: Vec<Result<ChartSeries, ChartError>> =
            stream::iter(eligibility.accepted.iter().copied())
                .map(|id| self.chart_for(id))
                .buffered(self.config.max_concurrency)
                .collect()
                .await;

        for result in results {
            match result {
                Ok(series) => report.series.push(series),
                Err(error) => report.fail(error),
            }
        }

        tracing::info!(
            requested = selected_ids.len(),
            series = report.series.len(),
            failed = report.failures.len(),
            "charting.build.done"
        );
        report
    }

    async fn chart_for(&self, id: ConfigId) -> Result<ChartSeries, ChartError> {
        let (brand, model) = match self.catalog.resolve(id) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%id, error = %e, "charting.resolve_failed");
                return Err(ChartError::UnknownConfiguration { id });
            }
        };

        let points = match self.forecaster.forecast(&self.history, brand, model).await {
            Ok(points) => points,
            Err(source) => {
                tracing::warn!(%id, %brand, model, error = %source, "charting.forecast_failed");
                return Err(ChartError::ForecastComputation {
                    id,
                    brand,
                    model: model.to_owned(),
                    source,
                });
            }
        };

        self.cache.record_all(id, &points);
        tracing::debug!(
            %id,
            points = points.len(),
            cached = self.cache.len(id),
            "charting.recorded"
        );
        Ok(self.assembler.assemble(device_label(brand, model), points))
    }
}

fn dedup_preserving_order(ids: &[ConfigId]) -> Vec<ConfigId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
