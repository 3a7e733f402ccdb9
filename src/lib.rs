//! # Option Stats - Quantitative analytics for equity options
//!
//! Risk/return analytics over point-in-time snapshots of an underlying's
//! price history and option chain.
//!
//! ## Overview
//!
//! - **Historical volatility**: six rolling estimators (close-to-close,
//!   Garman-Klass, Hodges-Tompkins, Parkinson, Rogers-Satchell, Yang-Zhang)
//! - **Probability cones**: lognormal price ranges at a confidence level
//! - **Monte Carlo**: GBM terminal-price distribution, binned
//! - **Option metrics**: premium, ROI, leverage, probability of profit,
//!   market pressure and a skew/liquidity screen
//!
//! ## Usage
//!
//! ```rust,no_run
//! use option_stats::prelude::*;
//!
//! let json = std::fs::read_to_string("XYZ.json").unwrap();
//! let snapshot = MarketSnapshot::from_json_str(&json).unwrap();
//!
//! let analyzer = OptionAnalyzer::with_config(AnalyticsConfig::quick());
//! let report = analyzer.analyze_snapshot(&snapshot).unwrap();
//!
//! println!("{} vol {:.2}%", report.symbol, report.volatility * 100.0);
//! for row in report.screened.rows() {
//!     println!("{:?} {} roi {:.2}%", row.option_type(), row.strike(), row.roi);
//! }
//! ```
//!
//! ## What This Library Does NOT Do
//!
//! - Fetch live data (snapshots come from the caller)
//! - Price options or fit implied volatility
//! - Stream or refresh data in real time

pub mod analyzer;
pub mod config;
pub mod core;
pub mod data;
pub mod metrics;
pub mod models;
pub mod volatility;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        ExpirationGroup, OptionChain, OptionContractSnapshot, OptionType, PriceBar, PriceField,
        PriceSeries, SpotQuote, StatsError, StatsResult,
    };

    // Data input
    pub use crate::data::{
        CacheConfig, CachedSource, DataCache, JsonFileSource, MarketDataSource, MarketSnapshot,
    };

    // Volatility
    pub use crate::volatility::{estimate, estimate_all, EstimatorKind, VolatilityEstimate};

    // Models
    pub use crate::models::{
        cone_series, norm_cdf, norm_ppf, probability_cone, simulate_distribution,
        touch_probability, GbmParams, PriceDistribution, ProbabilityConeResult,
    };

    // Metrics
    pub use crate::metrics::{
        derive_metrics, expiration_days, market_pressure, skew_screen, strike_activity,
        DerivedOptionMetric, Liquidity, MarketPressure, MetricColumn, MetricsTable, SkewCategory,
        SkewResult, SortKey, TableFilter,
    };

    // Pipeline
    pub use crate::analyzer::{AnalyticsReport, OptionAnalyzer};
    pub use crate::config::AnalyticsConfig;
}

// Re-export main types at crate root
pub use crate::analyzer::{AnalyticsReport, OptionAnalyzer};
pub use crate::core::{StatsError, StatsResult};
