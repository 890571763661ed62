// Rust guideline compliant 2026-10-18

//! Eligibility filter -- narrows requested ids to the forecastable ones.
//!
//! Entry point: [`EligibilityFilter::filter_forecastable`]. Configuration via
//! [`EligibilityConfig::builder`]. The sufficiency rule itself is delegated to
//! an injected `domain::Auditor` adapter.

use catalog::Catalog;
use domain::{AuditError, Auditor, ChartError, ConfigId, RetryPolicy, TransactionHistory};
use std::collections::HashSet;
use std::time::Duration;

/// Upper bound accepted by [`EligibilityConfigBuilder::max_retries`].
const MAX_RETRIES_LIMIT: u32 = 10;

// ---------------------------------------------------------------------------
// EligibilityError
// ---------------------------------------------------------------------------

/// Errors raised while configuring the eligibility filter.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityError {
    /// The supplied configuration is invalid.
    #[error("invalid eligibility configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ErrorLog
// ---------------------------------------------------------------------------

/// Insertion-ordered list of human-readable error messages with set semantics.
///
/// Pushing a message that is already present is a no-op, so the same
/// (brand, model) rejected through two different ids yields one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog {
    messages: Vec<String>,
    seen: HashSet<String>,
}

impl ErrorLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` unless already present. Returns `true` when appended.
    pub fn push(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.seen.contains(&message) {
            return false;
        }
        self.seen.insert(message.clone());
        self.messages.push(message);
        true
    }

    /// Merge every message of `other`, keeping set semantics.
    pub fn merge(&mut self, other: &Self) {
        for message in &other.messages {
            self.push(message.as_str());
        }
    }

    /// Messages in first-seen order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `true` when `message` has been recorded.
    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.seen.contains(message)
    }

    /// Number of distinct messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// `true` when no message has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consume the log, returning the messages in first-seen order.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl Extend<String> for ErrorLog {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for message in iter {
            self.push(message);
        }
    }
}

// ---------------------------------------------------------------------------
// EligibilityConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for an [`EligibilityFilter`].
///
/// Construct via [`EligibilityConfig::builder`].
#[derive(Debug, Clone, Copy)]
pub struct EligibilityConfig {
    /// Retry policy applied around each auditor call.
    pub retry: RetryPolicy,
}

/// Builder for [`EligibilityConfig`].
///
/// Obtain via [`EligibilityConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct EligibilityConfigBuilder {
    max_retries: u32,
    retry_backoff: Duration,
}

impl EligibilityConfig {
    /// Create a builder.
    ///
    /// Default values: `max_retries = 0`, `retry_backoff = 50 ms`.
    #[must_use]
    pub fn builder() -> EligibilityConfigBuilder {
        EligibilityConfigBuilder { max_retries: 0, retry_backoff: Duration::from_millis(50) }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self { retry: RetryPolicy::none() }
    }
}

impl EligibilityConfigBuilder {
    /// Allow up to `n` retries of a failed auditor call.
    #[must_use]
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Override the delay between two auditor attempts.
    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError::InvalidConfig`] when `max_retries` exceeds 10.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<EligibilityConfig, EligibilityError> {
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(EligibilityError::InvalidConfig {
                reason: format!("max_retries must be <= {MAX_RETRIES_LIMIT}"),
            });
        }
        Ok(EligibilityConfig { retry: RetryPolicy::new(self.max_retries, self.retry_backoff) })
    }
}

// ---------------------------------------------------------------------------
// EligibilityFilter
// ---------------------------------------------------------------------------

/// Outcome of one [`EligibilityFilter::filter_forecastable`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eligibility {
    /// Forecastable ids, in input order, without duplicates.
    pub accepted: Vec<ConfigId>,
    /// Deduplicated messages for every rejected id.
    pub errors: ErrorLog,
    /// One typed failure per rejected id.
    pub rejections: Vec<ChartError>,
}

/// Filters candidate ids down to those with enough historical transactions.
///
/// Generic over the `Auditor` port; reads the catalog and the history but
/// never mutates them, and never touches the forecast cache.
#[derive(Debug)]
pub struct EligibilityFilter<A: Auditor> {
    auditor: A,
    config: EligibilityConfig,
}

impl<A: Auditor> EligibilityFilter<A> {
    /// Create a filter delegating the sufficiency rule to `auditor`.
    #[must_use]
    pub fn new(auditor: A, config: EligibilityConfig) -> Self {
        Self { auditor, config }
    }

    /// The wrapped auditor.
    #[must_use]
    pub fn auditor(&self) -> &A {
        &self.auditor
    }

    /// Split `ids` into forecastable ids and rejections.
    ///
    /// Unknown ids are rejected with `ChartError::UnknownConfiguration`;
    /// devices without enough history with `ChartError::InsufficientData`
    /// (message `"{brand} {model} - Not Enough Transactions"`); auditor
    /// failures that survive the retry policy with
    /// `ChartError::AuditUnavailable`. A repeated id is evaluated once.
    pub async fn filter_forecastable(
        &self,
        catalog: &Catalog,
        history: &TransactionHistory,
        ids: &[ConfigId],
    ) -> Eligibility {
        let mut outcome = Eligibility::default();
        let mut seen = HashSet::with_capacity(ids.len());

        for &id in ids {
            if !seen.insert(id) {
                continue;
            }

            let (brand, model) = match catalog.resolve(id) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(%id, error = %e, "eligibility.unknown_id");
                    reject(&mut outcome, ChartError::UnknownConfiguration { id });
                    continue;
                }
            };

            let audit = self
                .config
                .retry
                .run(
                    "auditor.has_enough_transactions",
                    |_: &AuditError| true,
                    || self.auditor.has_enough_transactions(history, brand, model),
                )
                .await;

            match audit {
                Ok(true) => {
                    tracing::debug!(%id, %brand, model, "eligibility.accepted");
                    outcome.accepted.push(id);
                }
                Ok(false) => {
                    tracing::info!(%id, %brand, model, "eligibility.insufficient_data");
                    reject(
                        &mut outcome,
                        ChartError::InsufficientData { id, brand, model: model.to_owned() },
                    );
                }
                Err(source) => {
                    tracing::warn!(%id, %brand, model, error = %source, "eligibility.audit_failed");
                    reject(
                        &mut outcome,
                        ChartError::AuditUnavailable {
                            id,
                            brand,
                            model: model.to_owned(),
                            source,
                        },
                    );
                }
            }
        }

        tracing::debug!(
            requested = ids.len(),
            accepted = outcome.accepted.len(),
            rejected = outcome.rejections.len(),
            "eligibility.done"
        );
        outcome
    }
}

fn reject(outcome: &mut Eligibility, error: ChartError) {
    outcome.errors.push(error.to_string());
    outcome.rejections.push(error);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{EligibilityConfig, EligibilityError, EligibilityFilter, ErrorLog};
    use catalog::Catalog;
    use chrono::NaiveDate;
    use domain::{
        AuditError, Auditor, Brand, ChartError, ConfigId, HardwareConfiguration, Transaction,
        TransactionHistory,
    };
    use std::cell::Cell;
    use std::time::Duration;

    // ------------------------------------------------------------------
    // Test helpers
    // ------------------------------------------------------------------

    /// Accepts a device when the history holds at least `min` rows for it.
    struct CountingAuditor {
        min: usize,
        calls: Cell<u32>,
    }

    impl CountingAuditor {
        fn new(min: usize) -> Self {
            Self { min, calls: Cell::new(0) }
        }
    }

    impl Auditor for CountingAuditor {
        async fn has_enough_transactions(
            &self,
            history: &TransactionHistory,
            brand: Brand,
            model: &str,
        ) -> Result<bool, AuditError> {
            self.calls.set(self.calls.get() + 1);
            Ok(history.count_for(brand, model) >= self.min)
        }
    }

    /// Fails the first `failures` calls, then accepts everything.
    struct FlakyAuditor {
        failures: u32,
        calls: Cell<u32>,
    }

    impl Auditor for FlakyAuditor {
        async fn has_enough_transactions(
            &self,
            _history: &TransactionHistory,
            _brand: Brand,
            _model: &str,
        ) -> Result<bool, AuditError> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() <= self.failures {
                return Err(AuditError::Unavailable { reason: "busy".to_owned() });
            }
            Ok(true)
        }
    }

    fn history_rows(brand: Brand, model: &str, n: u32) -> Vec<Transaction> {
        (0..n)
            .map(|i| Transaction {
                brand,
                model: model.to_owned(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(u64::from(i)),
                price: 500.0,
            })
            .collect()
    }

    /// 1: Apple iPhone 12 (enough data), 2: Samsung Galaxy S21 (not enough),
    /// 3: Samsung Galaxy S21 again under another id.
    fn fixture() -> (Catalog, TransactionHistory) {
        let catalog = Catalog::from_entries(vec![
            HardwareConfiguration::new(ConfigId(1), Brand::Apple, "iPhone 12"),
            HardwareConfiguration::new(ConfigId(2), Brand::Samsung, "Galaxy S21"),
            HardwareConfiguration::new(ConfigId(3), Brand::Samsung, "Galaxy S21"),
        ])
        .unwrap();
        let mut rows = history_rows(Brand::Apple, "iPhone 12", 10);
        rows.extend(history_rows(Brand::Samsung, "Galaxy S21", 2));
        (catalog, TransactionHistory::new(rows))
    }

    fn make_filter(min: usize) -> EligibilityFilter<CountingAuditor> {
        EligibilityFilter::new(CountingAuditor::new(min), EligibilityConfig::default())
    }

    // ------------------------------------------------------------------
    // ErrorLog
    // ------------------------------------------------------------------

    #[test]
    fn error_log_has_set_semantics() {
        let mut log = ErrorLog::new();
        assert!(log.push("a"));
        assert!(log.push("b"));
        assert!(!log.push("a"));
        assert_eq!(log.messages(), ["a".to_owned(), "b".to_owned()]);
        assert!(log.contains("b"));
    }

    #[test]
    fn error_log_merge_keeps_first_seen_order() {
        let mut first = ErrorLog::new();
        first.push("x");
        first.push("y");
        let mut second = ErrorLog::new();
        second.push("y");
        second.push("z");
        first.merge(&second);
        assert_eq!(first.into_messages(), vec!["x", "y", "z"]);
    }

    #[test]
    fn error_log_extend_deduplicates() {
        let mut log = ErrorLog::new();
        log.extend(vec!["m".to_owned(), "m".to_owned()]);
        assert_eq!(log.len(), 1);
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    #[test]
    fn config_rejects_excessive_retries() {
        let result = EligibilityConfig::builder().max_retries(11).build();
        assert!(matches!(result, Err(EligibilityError::InvalidConfig { .. })));
    }

    #[test]
    fn config_builder_sets_retry_policy() {
        let config = EligibilityConfig::builder()
            .max_retries(2)
            .retry_backoff(Duration::from_millis(5))
            .build()
            .unwrap();
        assert_eq!(config.retry.max_retries(), 2);
        assert_eq!(config.retry.backoff(), Duration::from_millis(5));
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn scenario_accepts_sufficient_and_rejects_insufficient() {
        let (catalog, history) = fixture();
        let filter = make_filter(5);
        let outcome =
            filter.filter_forecastable(&catalog, &history, &[ConfigId(1), ConfigId(2)]).await;

        assert_eq!(outcome.accepted, vec![ConfigId(1)]);
        assert_eq!(outcome.errors.messages(), ["Samsung Galaxy S21 - Not Enough Transactions"]);
        assert_eq!(outcome.rejections.len(), 1);
        assert!(matches!(
            outcome.rejections[0],
            ChartError::InsufficientData { id: ConfigId(2), .. }
        ));
    }

    #[tokio::test]
    async fn same_device_rejected_twice_yields_one_message() {
        let (catalog, history) = fixture();
        let filter = make_filter(5);
        let outcome = filter
            .filter_forecastable(&catalog, &history, &[ConfigId(2), ConfigId(3)])
            .await;

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.rejections.len(), 2, "typed failures stay per id");
    }

    #[tokio::test]
    async fn accepted_preserves_order_without_duplicates() {
        let (catalog, history) = fixture();
        let filter = make_filter(1);
        let outcome = filter
            .filter_forecastable(
                &catalog,
                &history,
                &[ConfigId(3), ConfigId(1), ConfigId(3), ConfigId(2), ConfigId(1)],
            )
            .await;

        assert_eq!(outcome.accepted, vec![ConfigId(3), ConfigId(1), ConfigId(2)]);
        assert_eq!(filter.auditor().calls.get(), 3, "repeated ids are audited once");
    }

    #[tokio::test]
    async fn unknown_id_is_rejected_not_fatal() {
        let (catalog, history) = fixture();
        let filter = make_filter(5);
        let outcome = filter
            .filter_forecastable(&catalog, &history, &[ConfigId(99), ConfigId(1)])
            .await;

        assert_eq!(outcome.accepted, vec![ConfigId(1)]);
        assert_eq!(
            outcome.rejections,
            vec![ChartError::UnknownConfiguration { id: ConfigId(99) }]
        );
        assert_eq!(outcome.errors.messages(), ["unknown configuration id 99"]);
    }

    #[tokio::test]
    async fn filtering_is_idempotent() {
        let (catalog, history) = fixture();
        let filter = make_filter(5);
        let ids = [ConfigId(1), ConfigId(2), ConfigId(3), ConfigId(42)];
        let first = filter.filter_forecastable(&catalog, &history, &ids).await;
        let second = filter.filter_forecastable(&catalog, &history, &ids).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_request_yields_empty_outcome() {
        let (catalog, history) = fixture();
        let outcome = make_filter(5).filter_forecastable(&catalog, &history, &[]).await;
        assert!(outcome.accepted.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn auditor_failure_is_retried() {
        let (catalog, history) = fixture();
        let config = EligibilityConfig::builder().max_retries(2).build().unwrap();
        let auditor = FlakyAuditor { failures: 2, calls: Cell::new(0) };
        let filter = EligibilityFilter::new(auditor, config);
        let outcome = filter.filter_forecastable(&catalog, &history, &[ConfigId(1)]).await;

        assert_eq!(outcome.accepted, vec![ConfigId(1)]);
        assert_eq!(filter.auditor().calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn auditor_failure_after_retries_is_per_id() {
        let (catalog, history) = fixture();
        let config = EligibilityConfig::builder().max_retries(1).build().unwrap();
        let filter =
            EligibilityFilter::new(FlakyAuditor { failures: 2, calls: Cell::new(0) }, config);
        let outcome = filter
            .filter_forecastable(&catalog, &history, &[ConfigId(1), ConfigId(2)])
            .await;

        // id 1 burns both failures; id 2 succeeds on its first attempt.
        assert_eq!(outcome.accepted, vec![ConfigId(2)]);
        assert!(matches!(
            outcome.rejections[0],
            ChartError::AuditUnavailable { id: ConfigId(1), .. }
        ));
        assert_eq!(
            outcome.errors.messages(),
            ["Apple iPhone 12 - audit unavailable: busy"]
        );
    }
}
