//! Analytics configuration
//!
//! Bundles every tunable of the pipeline. Fields missing from a JSON file
//! take their default values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{StatsError, StatsResult};
use crate::metrics::{MetricsConfig, SkewConfig, TableFilter};
use crate::models::{check_confidence, SimulationConfig};
use crate::volatility::VolatilityConfig;

/// Full pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub volatility: VolatilityConfig,
    pub metrics: MetricsConfig,
    pub simulation: SimulationConfig,
    pub skew: SkewConfig,
    pub table: TableFilter,
}

impl AnalyticsConfig {
    /// Fewer simulation paths, for interactive use
    pub fn quick() -> Self {
        Self {
            simulation: SimulationConfig {
                paths: 50_000,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> StatsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> StatsResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        tracing::debug!("Loading configuration from {:?}", path);
        Self::from_json_str(&json)
    }

    /// Reject settings no pipeline stage can run with
    pub fn validate(&self) -> StatsResult<()> {
        if self.volatility.window < 2 {
            return Err(StatsError::configuration(format!(
                "volatility window must be at least 2, got {}",
                self.volatility.window
            )));
        }
        if self.volatility.trading_periods == 0 {
            return Err(StatsError::configuration("trading periods must be positive"));
        }
        check_confidence(self.metrics.confidence)?;
        if self.skew.min_days >= self.skew.max_days {
            return Err(StatsError::configuration(format!(
                "skew band [{}, {}) is empty",
                self.skew.min_days, self.skew.max_days
            )));
        }
        if self.simulation.paths == 0 || self.simulation.steps == 0 {
            return Err(StatsError::configuration("simulation needs at least one path and one step"));
        }
        if !self.simulation.bin_width.is_finite() || self.simulation.bin_width <= 0.0 {
            return Err(StatsError::configuration("histogram bin width must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::EstimatorKind;

    #[test]
    fn test_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.volatility.window, 30);
        assert_eq!(config.volatility.estimator, EstimatorKind::LogReturns);
        assert_eq!(config.volatility.trading_periods, 252);
        assert_eq!(config.metrics.confidence, 0.7);
        assert_eq!(config.metrics.horizon_days, 45);
        assert_eq!(config.simulation.paths, 1_000_000);
        assert_eq!(config.skew.min_days, 28);
        assert_eq!(config.skew.max_days, 35);
        assert!(config.validate().is_ok());
        assert!(AnalyticsConfig::quick().simulation.paths < config.simulation.paths);
    }

    #[test]
    fn test_partial_json() {
        let config = AnalyticsConfig::from_json_str(
            r#"{"volatility": {"window": 20, "estimator": "yang_zhang", "trading_periods": 252},
                "metrics": {"horizon_days": 60, "confidence": 0.9}}"#,
        )
        .unwrap();
        assert_eq!(config.volatility.window, 20);
        assert_eq!(config.volatility.estimator, EstimatorKind::YangZhang);
        assert_eq!(config.metrics.confidence, 0.9);
        assert_eq!(config.skew.max_days, 35);
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let err = AnalyticsConfig::from_json_str(
            r#"{"metrics": {"horizon_days": 45, "confidence": 1.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::Configuration(_)));
    }

    #[test]
    fn test_unknown_estimator_is_serialization_error() {
        let err = AnalyticsConfig::from_json_str(
            r#"{"volatility": {"window": 20, "estimator": "bogus", "trading_periods": 252}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::Serialization(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"table": {"min_roi": 1.5, "max_abs_delta": 0.3, "beyond_cone": true}}"#)
            .unwrap();
        let config = AnalyticsConfig::from_json_file(&path).unwrap();
        assert_eq!(config.table.min_roi, 1.5);
        assert!(config.table.beyond_cone);
        assert!(AnalyticsConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
