// Rust guideline compliant 2026-10-18

//! DEMO adapter for the `CatalogSource` port.
//!
//! Serves a fixed device catalog and a synthetic monthly transaction history.
//! Prices start at a random list price and decay month over month with some
//! noise. A few devices are deliberately scarce so the eligibility filter has
//! something to reject.

use chrono::NaiveDate;
use domain::{
    Brand, CatalogError, CatalogSource, ConfigId, HardwareConfiguration, Transaction,
    TransactionHistory,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// (brand, model, scarce) for every catalog entry; ids are assigned from 1.
const DEVICES: &[(Brand, &str, bool)] = &[
    (Brand::Apple, "iPhone 12", false),
    (Brand::Apple, "iPhone 13", false),
    (Brand::Samsung, "Galaxy S21", true),
    (Brand::Samsung, "Galaxy A52", false),
    (Brand::Google, "Pixel 7", false),
    (Brand::Huawei, "P40", true),
    (Brand::Xiaomi, "Redmi Note 10", false),
    (Brand::OnePlus, "9 Pro", false),
    (Brand::Motorola, "Edge 20", false),
    (Brand::Nokia, "G50", true),
    (Brand::Sony, "Xperia 5", false),
];

/// First month of the synthetic history.
const START_YEAR: i32 = 2023;

/// Concrete adapter for the `domain::CatalogSource` port.
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    seed: u64,
    months: u32,
}

impl DemoCatalog {
    /// Create a source covering `months` months of history.
    ///
    /// `seed = Some(s)` produces the same history on every load; `None` picks
    /// a random seed once, at construction.
    #[must_use]
    pub fn new(seed: Option<u64>, months: u32) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self { seed, months }
    }

    /// The seed the history is generated from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn generate(&self) -> Result<Vec<Transaction>, CatalogError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut transactions = Vec::new();

        for &(brand, model, scarce) in DEVICES {
            let list_price = f64::from(rng.random_range(300u32..=1_200));

            if scarce {
                // Two observations: below any sensible threshold.
                for _ in 0..2 {
                    transactions.push(Transaction {
                        brand,
                        model: model.to_owned(),
                        date: month_day(0, rng.random_range(1..=28))?,
                        price: list_price,
                    });
                }
                continue;
            }

            for month in 0..self.months {
                let trend = list_price * 0.98_f64.powf(f64::from(month));
                for _ in 0..rng.random_range(2..=5) {
                    let noise = rng.random_range(-0.05..=0.05);
                    transactions.push(Transaction {
                        brand,
                        model: model.to_owned(),
                        date: month_day(month, rng.random_range(1..=28))?,
                        price: (trend * (1.0 + noise) * 100.0).round() / 100.0,
                    });
                }
            }
        }
        Ok(transactions)
    }
}

impl CatalogSource for DemoCatalog {
    async fn load_configurations(&self) -> Result<Vec<HardwareConfiguration>, CatalogError> {
        Ok(DEVICES
            .iter()
            .zip(1u32..)
            .map(|(&(brand, model, _), id)| HardwareConfiguration::new(ConfigId(id), brand, model))
            .collect())
    }

    async fn load_history(&self) -> Result<TransactionHistory, CatalogError> {
        let transactions = self.generate()?;
        tracing::info!(seed = self.seed, transactions = transactions.len(), "demo_catalog.history");
        Ok(TransactionHistory::new(transactions))
    }
}

/// Date `offset` months after January of [`START_YEAR`].
fn month_day(offset: u32, day: u32) -> Result<NaiveDate, CatalogError> {
    let year = i32::try_from(offset / 12).ok().and_then(|y| START_YEAR.checked_add(y));
    year.and_then(|y| NaiveDate::from_ymd_opt(y, offset % 12 + 1, day)).ok_or_else(|| {
        CatalogError::SourceUnavailable { reason: format!("no calendar date at +{offset} months") }
    })
}
