// Rust guideline compliant 2026-10-18

//! Price-forecast chart entry point.
//!
//! Wires the chart service to the DEMO catalog, the minimum-count auditor and
//! the linear-trend engine, selects a set of devices and prints one chart
//! series per forecastable device as JSON. Messages for rejected or failed
//! devices go to stderr.
//!
//! # Usage
//!
//! ```text
//! # Chart every device of the demo catalog
//! RUST_LOG=info cargo run -p price_forecast
//!
//! # Chart a few devices three times over a 6-month horizon
//! RUST_LOG=debug cargo run -p price_forecast -- --select 1,3,99 --runs 3 --horizon 6
//! ```

mod adapters;

use std::sync::Arc;
use std::time::Duration;

use adapters::count_auditor::MinimumCountAuditor;
use adapters::demo_catalog::DemoCatalog;
use adapters::linear_trend_engine::LinearTrendEngine;
use anyhow::Context as _;
use catalog::Catalog;
use charting::{ChartService, ChartServiceConfig};
use clap::Parser;
use domain::{CatalogSource as _, ConfigId, DEFAULT_HORIZON_MONTHS};
use eligibility::{EligibilityConfig, EligibilityFilter};
use forecast_cache::{ForecastCache, ForecastCacheConfig, WritePolicy};
use forecaster::{ForecastAdapter, ForecasterConfig};
use tracing::Instrument as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "price-forecast")]
#[command(about = "Forecast device prices and print chart series")]
struct Cli {
    /// Configuration ids to chart; every catalog entry when omitted.
    #[arg(long, value_delimiter = ',')]
    select: Vec<u32>,

    /// Number of monthly periods to forecast.
    #[arg(long, default_value_t = DEFAULT_HORIZON_MONTHS)]
    horizon: u32,

    /// How many times to build the charts; the cache keeps every run.
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Seed for the synthetic history.
    #[arg(long)]
    seed: Option<u64>,

    /// Months of synthetic history per device.
    #[arg(long, default_value_t = 24)]
    history_months: u32,

    /// Observations a device needs before it is forecast.
    #[arg(long, default_value_t = 5)]
    min_transactions: usize,

    /// Time box for one forecast, in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    timeout_ms: u64,

    /// Keep one cached point per (id, date) instead of appending every run.
    #[arg(long)]
    upsert: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    // -- Catalog and history --
    let source = DemoCatalog::new(cli.seed, cli.history_months);
    let catalog = Arc::new(Catalog::load(&source).await.context("failed to load catalog")?);
    let history = Arc::new(source.load_history().await.context("failed to load history")?);
    tracing::info!(seed = source.seed(), "main.history");

    // -- Components --
    let forecaster_config = ForecasterConfig::builder(cli.horizon)
        .timeout(Duration::from_millis(cli.timeout_ms))
        .max_retries(1)
        .build()
        .context("failed to build forecaster config")?;
    let eligibility_config =
        EligibilityConfig::builder().build().context("failed to build eligibility config")?;
    let write_policy = if cli.upsert { WritePolicy::Upsert } else { WritePolicy::Append };
    let cache_config = ForecastCacheConfig::builder()
        .write_policy(write_policy)
        .build()
        .context("failed to build cache config")?;
    let service_config =
        ChartServiceConfig::builder().build().context("failed to build chart service config")?;

    let cache = Arc::new(ForecastCache::new(cache_config));
    let auditor = MinimumCountAuditor::new(cli.min_transactions);
    tracing::info!(
        min_transactions = auditor.min_transactions(),
        write_policy = ?cache.config().write_policy,
        "main.config"
    );
    let service = ChartService::new(
        service_config,
        Arc::clone(&catalog),
        history,
        EligibilityFilter::new(auditor, eligibility_config),
        ForecastAdapter::new(LinearTrendEngine::new(), forecaster_config),
        Arc::clone(&cache),
    );

    // Unknown ids stay in the request so they show up in the report.
    let selection: Vec<ConfigId> = if cli.select.is_empty() {
        catalog.ids()
    } else {
        cli.select.iter().copied().map(ConfigId).collect()
    };
    service.set_selection(&selection).await;
    tracing::info!(selected = catalog.selected_ids().await.len(), "main.selection");

    let charts = async {
        let mut session = service.session();
        for run in 1..=cli.runs {
            let report = session
                .build_charts(&selection)
                .instrument(tracing::info_span!("build", run))
                .await;
            println!(
                "{}",
                serde_json::to_string_pretty(&report.series)
                    .context("failed to serialize chart series")?
            );
        }
        for message in session.errors().messages() {
            eprintln!("{message}");
        }
        anyhow::Ok(())
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("main.shutdown: ctrl_c received");
        }
        result = charts => {
            result?;
        }
    }

    tracing::info!(
        devices = cache.ids().len(),
        points = cache.total_points(),
        "main.cache"
    );
    Ok(())
}
