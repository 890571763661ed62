// Rust guideline compliant 2026-10-18

//! Minimum-count adapter for the `Auditor` port.

use domain::{AuditError, Auditor, Brand, TransactionHistory};

/// Accepts a device once its history holds at least `min_transactions`
/// observations.
#[derive(Debug, Clone, Copy)]
pub struct MinimumCountAuditor {
    min_transactions: usize,
}

impl MinimumCountAuditor {
    /// Create an auditor with the given threshold. A threshold of zero
    /// accepts every device.
    #[must_use]
    pub fn new(min_transactions: usize) -> Self {
        Self { min_transactions }
    }

    /// The configured threshold.
    #[must_use]
    pub fn min_transactions(&self) -> usize {
        self.min_transactions
    }
}

impl Auditor for MinimumCountAuditor {
    /// # Errors
    ///
    /// Currently infallible; returns `Ok(bool)`.
    async fn has_enough_transactions(
        &self,
        history: &TransactionHistory,
        brand: Brand,
        model: &str,
    ) -> Result<bool, AuditError> {
        let count = history.count_for(brand, model);
        tracing::debug!(%brand, model, count, min = self.min_transactions, "count_auditor.check");
        Ok(count >= self.min_transactions)
    }
}
