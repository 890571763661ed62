// Rust guideline compliant 2026-10-18

//! Mock adapters and fixtures shared by the service and session tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use catalog::Catalog;
use chrono::NaiveDate;
use domain::{
    AuditError, Auditor, Brand, ConfigId, ForecastEngine, ForecastError, ForecastPoint,
    HardwareConfiguration, Transaction, TransactionHistory,
};
use eligibility::{EligibilityConfig, EligibilityFilter};
use forecast_cache::{ForecastCache, ForecastCacheConfig};
use forecaster::{ForecastAdapter, ForecasterConfig};

use crate::{ChartService, ChartServiceConfig};

// ---------------------------------------------------------------------------
// Auditor
// ---------------------------------------------------------------------------

pub(crate) struct ThresholdAuditor {
    pub min: usize,
    pub calls: Cell<usize>,
}

impl ThresholdAuditor {
    pub(crate) fn new(min: usize) -> Self {
        Self { min, calls: Cell::new(0) }
    }
}

impl Auditor for ThresholdAuditor {
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

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
pub(crate) enum Behavior {
    Fail,
    Hang,
    Delay(Duration),
}

/// Answers a monthly declining forecast unless a model has a scripted behavior.
///
/// `calls` records models in start order, `finished` in completion order.
pub(crate) struct ScriptedEngine {
    pub scripts: HashMap<String, Behavior>,
    pub calls: RefCell<Vec<String>>,
    pub finished: RefCell<Vec<String>>,
}

impl ScriptedEngine {
    pub(crate) fn healthy() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: RefCell::new(Vec::new()),
            finished: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with(model: &str, behavior: Behavior) -> Self {
        Self::healthy().and(model, behavior)
    }

    pub(crate) fn and(mut self, model: &str, behavior: Behavior) -> Self {
        self.scripts.insert(model.to_owned(), behavior);
        self
    }
}

impl ForecastEngine for ScriptedEngine {
    async fn generate_future_forecast(
        &self,
        _history: &TransactionHistory,
        _brand: Brand,
        model: &str,
        horizon_months: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        self.calls.borrow_mut().push(model.to_owned());
        let result = match self.scripts.get(model).copied() {
            Some(Behavior::Fail) => {
                Err(ForecastError::ComputationFailed { reason: "singular matrix".to_owned() })
            }
            Some(Behavior::Hang) => std::future::pending().await,
            Some(Behavior::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(monthly_points(horizon_months))
            }
            None => Ok(monthly_points(horizon_months)),
        };
        self.finished.borrow_mut().push(model.to_owned());
        result
    }
}

pub(crate) fn monthly_points(horizon_months: u32) -> Vec<ForecastPoint> {
    (0..horizon_months)
        .map(|i| {
            let year = 2025 + i32::try_from(i / 12).unwrap();
            let date = NaiveDate::from_ymd_opt(year, 1 + i % 12, 1).unwrap();
            ForecastPoint::new(date, 800.0 - f64::from(i) * 10.0)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// 1 = Apple iPhone 12 (10 tx), 2 = Samsung Galaxy S21 (2 tx), 3 = Google Pixel 7 (10 tx).
pub(crate) fn catalog() -> Catalog {
    Catalog::from_entries(vec![
        HardwareConfiguration::new(ConfigId(1), Brand::Apple, "iPhone 12"),
        HardwareConfiguration::new(ConfigId(2), Brand::Samsung, "Galaxy S21"),
        HardwareConfiguration::new(ConfigId(3), Brand::Google, "Pixel 7"),
    ])
    .unwrap()
}

pub(crate) fn history() -> TransactionHistory {
    let mut transactions = Vec::new();
    for (brand, model, count) in [
        (Brand::Apple, "iPhone 12", 10),
        (Brand::Samsung, "Galaxy S21", 2),
        (Brand::Google, "Pixel 7", 10),
    ] {
        for day in 1..=count {
            transactions.push(Transaction {
                brand,
                model: model.to_owned(),
                date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
                price: 500.0,
            });
        }
    }
    TransactionHistory::new(transactions)
}

pub(crate) fn service(engine: ScriptedEngine) -> ChartService<ThresholdAuditor, ScriptedEngine> {
    service_with(
        engine,
        ChartServiceConfig::default(),
        ForecasterConfig::default(),
        ForecastCacheConfig::default(),
    )
}

pub(crate) fn service_with(
    engine: ScriptedEngine,
    service_config: ChartServiceConfig,
    forecaster_config: ForecasterConfig,
    cache_config: ForecastCacheConfig,
) -> ChartService<ThresholdAuditor, ScriptedEngine> {
    ChartService::new(
        service_config,
        Arc::new(catalog()),
        Arc::new(history()),
        EligibilityFilter::new(ThresholdAuditor::new(5), EligibilityConfig::default()),
        ForecastAdapter::new(engine, forecaster_config),
        Arc::new(ForecastCache::new(cache_config)),
    )
}
