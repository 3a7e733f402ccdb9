//! OptionAnalyzer - Main facade for the analytics pipeline
//!
//! Runs volatility estimation, probability cones, per-contract metrics,
//! market pressure, the Monte Carlo distribution and the skew screen over
//! one market snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::core::{OptionChain, PriceSeries, StatsResult};
use crate::data::MarketSnapshot;
use crate::metrics::{
    derive_metrics, market_pressure, skew_screen, MarketPressure, MetricsTable, SkewResult,
};
use crate::models::{cone_series, simulate_distribution, GbmParams, PriceDistribution, ProbabilityConeResult};
use crate::volatility::{estimate, EstimatorKind};

/// Everything computed for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    pub spot: f64,
    pub estimator: EstimatorKind,
    /// Latest annualized volatility; drives every downstream stage
    pub volatility: f64,
    /// Full rolling volatility sequence
    pub volatility_history: Vec<f64>,
    /// Cone for each day up to the metrics horizon
    pub cone: Vec<ProbabilityConeResult>,
    /// All derived rows within the horizon
    pub metrics: MetricsTable,
    /// Rows passing the configured table filter
    pub screened: MetricsTable,
    pub pressure: Vec<MarketPressure>,
    /// Terminal price distribution at the metrics horizon
    pub distribution: PriceDistribution,
    /// `None` when no expiration in the band lists all reference legs
    pub skew: Option<SkewResult>,
}

/// Main analyzer that runs the full pipeline
pub struct OptionAnalyzer {
    config: AnalyticsConfig,
}

impl OptionAnalyzer {
    /// Create a new analyzer with default configuration
    pub fn new() -> Self {
        Self {
            config: AnalyticsConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalyticsConfig) {
        self.config = config;
    }

    /// Analyze a provider snapshot, using its capture time as "now"
    pub fn analyze_snapshot(&self, snapshot: &MarketSnapshot) -> StatsResult<AnalyticsReport> {
        let series = snapshot.series()?;
        let quote = snapshot.quote()?;
        let chain = snapshot.option_chain()?;
        self.analyze(&series, quote.last_price, &chain, snapshot.captured_at)
    }

    /// Run every stage on already-parsed inputs
    ///
    /// `spot` drives the per-contract metrics, cone and simulation. The skew
    /// screen uses `chain.underlying_price`, falling back to `spot` when the
    /// chain carries none.
    ///
    /// Unlike [`estimate`], a history too short for one volatility value is
    /// an `InsufficientHistory` error here, since nothing downstream can run
    /// without it.
    pub fn analyze(
        &self,
        series: &PriceSeries,
        spot: f64,
        chain: &OptionChain,
        now: DateTime<Utc>,
    ) -> StatsResult<AnalyticsReport> {
        self.config.validate()?;
        let vol_config = &self.config.volatility;
        series.ensure_history(vol_config.window)?;

        let estimate = estimate(
            series,
            vol_config.window,
            vol_config.estimator,
            vol_config.trading_periods,
        )?;
        let volatility_history = estimate.to_vec();
        let volatility = volatility_history.last().copied().unwrap_or_default();
        tracing::info!(
            symbol = %chain.underlying,
            estimator = %vol_config.estimator,
            volatility,
            "estimated volatility"
        );

        let metrics_config = &self.config.metrics;
        let cone = cone_series(
            spot,
            volatility,
            metrics_config.horizon_days,
            metrics_config.confidence,
        )?;

        let metrics = MetricsTable::new(derive_metrics(chain, spot, volatility, now, metrics_config)?);
        let screened = metrics.filter(&self.config.table);
        let pressure = market_pressure(metrics.rows(), now);

        let time = f64::from(metrics_config.horizon_days) / f64::from(vol_config.trading_periods);
        let params = GbmParams::from_config(spot, time, volatility, &self.config.simulation);
        let distribution = simulate_distribution(&params)?;

        // the screen brackets strikes around the chain's own underlying price
        let skew_spot = if chain.underlying_price.is_finite() && chain.underlying_price > 0.0 {
            chain.underlying_price
        } else {
            spot
        };
        let skew = match skew_screen(chain, skew_spot, now, &self.config.skew) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("Skew screen skipped for {}: {}", chain.underlying, e);
                None
            }
        };

        tracing::info!(
            rows = metrics.len(),
            screened = screened.len(),
            expirations = pressure.len(),
            "analysis complete"
        );

        Ok(AnalyticsReport {
            symbol: chain.underlying.clone(),
            as_of: now,
            spot,
            estimator: vol_config.estimator,
            volatility,
            volatility_history,
            cone,
            metrics,
            screened,
            pressure,
            distribution,
            skew,
        })
    }
}

impl Default for OptionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
