//! Configuration for option-chain metrics

use serde::{Deserialize, Serialize};

/// Per-contract metric settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Largest day_diff kept; later expirations are dropped
    /// Default: 45
    pub horizon_days: u32,

    /// Probability cone confidence, strictly inside (0, 1)
    /// Default: 0.7
    pub confidence: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            horizon_days: 45,
            confidence: 0.7,
        }
    }
}

/// Skew and liquidity screen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkewConfig {
    /// First day_diff of the target expiration band (inclusive)
    /// Default: 28
    pub min_days: u32,

    /// End of the target expiration band (exclusive)
    /// Default: 35
    pub max_days: u32,

    /// Put reference level as a fraction of spot
    /// Default: 0.9
    pub put_moneyness: f64,

    /// Call reference level as a fraction of spot
    /// Default: 1.1
    pub call_moneyness: f64,

    /// Ask/bid ratio above which a leg counts as illiquid
    /// Default: 1.25
    pub max_ask_bid_ratio: f64,
}

impl Default for SkewConfig {
    fn default() -> Self {
        Self {
            min_days: 28,
            max_days: 35,
            put_moneyness: 0.9,
            call_moneyness: 1.1,
            max_ask_bid_ratio: 1.25,
        }
    }
}

/// Row filter for the derived-metrics table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFilter {
    /// Minimum ROI in percent
    /// Default: 0.0
    pub min_roi: f64,

    /// Maximum |delta|; rows without a delta never pass
    /// Default: 1.0
    pub max_abs_delta: f64,

    /// Keep only calls struck at or above the cone's upper bound and puts
    /// at or below its lower bound
    /// Default: false
    pub beyond_cone: bool,
}

impl Default for TableFilter {
    fn default() -> Self {
        Self {
            min_roi: 0.0,
            max_abs_delta: 1.0,
            beyond_cone: false,
        }
    }
}
