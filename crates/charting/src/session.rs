// Rust guideline compliant 2026-10-18

//! Caller-scoped view over a [`ChartService`] that keeps an error log.

use domain::{Auditor, ConfigId, ForecastEngine};
use eligibility::{Eligibility, ErrorLog};

use crate::{ChartReport, ChartService};

/// Accumulates the error messages of every call made through it.
///
/// A message already logged by an earlier call is not logged again. The
/// per-call [`ChartReport`] and [`Eligibility`] values are returned unchanged.
#[derive(Debug)]
pub struct ChartSession<'a, A: Auditor, E: ForecastEngine> {
    service: &'a ChartService<A, E>,
    errors: ErrorLog,
}

impl<'a, A: Auditor, E: ForecastEngine> ChartSession<'a, A, E> {
    pub(crate) fn new(service: &'a ChartService<A, E>) -> Self {
        Self { service, errors: ErrorLog::new() }
    }

    /// See [`ChartService::build_charts`].
    pub async fn build_charts(&mut self, selected_ids: &[ConfigId]) -> ChartReport {
        let report = self.service.build_charts(selected_ids).await;
        self.errors.merge(&report.errors);
        report
    }

    /// See [`ChartService::filter_forecastable`].
    pub async fn filter_forecastable(&mut self, ids: &[ConfigId]) -> Eligibility {
        let eligibility = self.service.filter_forecastable(ids).await;
        self.errors.merge(&eligibility.errors);
        eligibility
    }

    /// See [`ChartService::set_selection`].
    pub async fn set_selection(&self, ids: &[ConfigId]) {
        self.service.set_selection(ids).await;
    }

    /// Messages collected so far.
    #[must_use]
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// End the session and keep its log.
    #[must_use]
    pub fn into_errors(self) -> ErrorLog {
        self.errors
    }
}
