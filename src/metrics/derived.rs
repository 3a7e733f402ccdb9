//! Per-contract derived metrics
//!
//! Premium, ROI, leverage, probability of profit and cone bounds for every
//! unexpired contract within the horizon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MetricsConfig;
use crate::core::{OptionChain, OptionContractSnapshot, OptionType, StatsError, StatsResult};
use crate::models::{check_confidence, probability_cone, round_dp, touch_probability};

/// Derived economics of one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedOptionMetric {
    pub contract: OptionContractSnapshot,
    /// Whole days to expiration
    pub day_diff: u32,
    /// Bid times multiplier, in currency
    pub premium: f64,
    /// Premium as a percentage of strike notional
    pub roi: f64,
    /// |delta| · spot / premium; 0 without a delta or premium
    pub leverage: f64,
    pub probability_of_profit: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl DerivedOptionMetric {
    pub fn option_type(&self) -> OptionType {
        self.contract.option_type
    }

    pub fn strike(&self) -> f64 {
        self.contract.strike
    }

    pub fn delta(&self) -> Option<f64> {
        self.contract.delta
    }

    /// Strike lies outside the probability cone on the contract's own side
    pub fn is_beyond_cone(&self) -> bool {
        match self.contract.option_type {
            OptionType::Call => self.contract.strike >= self.upper_bound,
            OptionType::Put => self.contract.strike <= self.lower_bound,
        }
    }
}

/// Derive metrics for every contract in `chain` expiring within the horizon
///
/// Expired contracts are skipped. Contracts are ordered by ascending
/// day_diff (calls before puts on ties) and the first expiration beyond
/// `config.horizon_days` ends the table.
pub fn derive_metrics(
    chain: &OptionChain,
    spot: f64,
    volatility: f64,
    now: DateTime<Utc>,
    config: &MetricsConfig,
) -> StatsResult<Vec<DerivedOptionMetric>> {
    check_confidence(config.confidence)?;

    let mut dated: Vec<(i64, &OptionContractSnapshot)> =
        chain.contracts().map(|c| (c.day_diff(now), c)).collect();
    let total = dated.len();
    dated.retain(|(d, _)| *d >= 0);
    let expired = total - dated.len();
    dated.sort_by_key(|(d, _)| *d);

    let horizon = i64::from(config.horizon_days);
    let metrics = dated
        .into_iter()
        .take_while(|(d, _)| *d <= horizon)
        .map(|(d, contract)| derive_one(contract, d as u32, spot, volatility, config.confidence))
        .collect::<StatsResult<Vec<_>>>()?;

    tracing::debug!(
        underlying = %chain.underlying,
        total,
        expired,
        beyond_horizon = total - expired - metrics.len(),
        kept = metrics.len(),
        "derived option metrics"
    );
    Ok(metrics)
}

fn derive_one(
    contract: &OptionContractSnapshot,
    day_diff: u32,
    spot: f64,
    volatility: f64,
    confidence: f64,
) -> StatsResult<DerivedOptionMetric> {
    if !(contract.strike.is_finite() && contract.strike > 0.0) {
        return Err(StatsError::data(format!(
            "{} contract has invalid strike {}",
            contract.option_type.label(),
            contract.strike
        )));
    }
    if !contract.bid.is_finite() || !contract.multiplier.is_finite() {
        return Err(StatsError::data(format!(
            "{} {} contract has a non-numeric bid or multiplier",
            contract.option_type.label(),
            contract.strike
        )));
    }

    let premium = round_dp(contract.bid * contract.multiplier, 2);
    let roi = round_dp(premium / (contract.strike * 100.0) * 100.0, 2);
    let leverage = match contract.delta.filter(|d| d.is_finite()) {
        Some(delta) if premium != 0.0 => round_dp(delta.abs() * spot / premium, 3),
        _ => 0.0,
    };
    let probability_of_profit = if day_diff > 0 {
        touch_probability(spot, contract.strike, volatility, day_diff)
    } else {
        0.0
    };
    let (lower_bound, upper_bound) = probability_cone(spot, volatility, day_diff, confidence)?;

    Ok(DerivedOptionMetric {
        contract: contract.clone(),
        day_diff,
        premium,
        roi,
        leverage,
        probability_of_profit,
        lower_bound,
        upper_bound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()
    }

    fn contract(option_type: OptionType, strike: f64, days: i64, bid: f64) -> OptionContractSnapshot {
        let expiry = now() + Duration::days(days) + Duration::hours(2);
        OptionContractSnapshot::new(option_type, strike, expiry, bid, bid + 0.1)
    }

    #[test]
    fn test_metric_values() {
        let mut chain = OptionChain::new("XYZ", 100.0);
        chain.add_contract(contract(OptionType::Put, 90.0, 30, 1.234).with_delta(-0.2));

        let config = MetricsConfig::default();
        let metrics = derive_metrics(&chain, 100.0, 0.3, now(), &config).unwrap();
        assert_eq!(metrics.len(), 1);

        let m = &metrics[0];
        assert_eq!(m.day_diff, 30);
        assert_eq!(m.premium, 123.4);
        assert_eq!(m.roi, round_dp(123.4 / 9000.0 * 100.0, 2));
        assert_eq!(m.leverage, round_dp(0.2 * 100.0 / 123.4, 3));
        assert_eq!(m.probability_of_profit, touch_probability(100.0, 90.0, 0.3, 30));
        assert_eq!((m.lower_bound, m.upper_bound), probability_cone(100.0, 0.3, 30, 0.7).unwrap());
    }

    #[test]
    fn test_absent_delta_zero_leverage() {
        let mut chain = OptionChain::new("XYZ", 100.0);
        chain.add_contract(contract(OptionType::Call, 110.0, 10, 2.0));
        chain.add_contract(contract(OptionType::Call, 120.0, 10, 0.0).with_delta(0.1));

        let metrics = derive_metrics(&chain, 100.0, 0.3, now(), &MetricsConfig::default()).unwrap();
        assert!(metrics.iter().all(|m| m.leverage == 0.0));
    }

    #[test]
    fn test_same_day_expiry_zero_probability() {
        let mut chain = OptionChain::new("XYZ", 100.0);
        chain.add_contract(contract(OptionType::Call, 105.0, 0, 1.0));
        let metrics = derive_metrics(&chain, 100.0, 0.3, now(), &MetricsConfig::default()).unwrap();
        assert_eq!(metrics[0].day_diff, 0);
        assert_eq!(metrics[0].probability_of_profit, 0.0);
        assert_eq!((metrics[0].lower_bound, metrics[0].upper_bound), (100.0, 100.0));
    }

    #[test]
    fn test_horizon_and_expiry_filtering() {
        let mut chain = OptionChain::new("XYZ", 100.0);
        chain.add_contract(contract(OptionType::Call, 100.0, -3, 1.0));
        chain.add_contract(contract(OptionType::Call, 100.0, 60, 1.0));
        chain.add_contract(contract(OptionType::Put, 95.0, 20, 1.0));
        chain.add_contract(contract(OptionType::Call, 105.0, 7, 1.0));
        chain.add_contract(contract(OptionType::Put, 95.0, 7, 1.0));

        let config = MetricsConfig { horizon_days: 30, confidence: 0.7 };
        let metrics = derive_metrics(&chain, 100.0, 0.3, now(), &config).unwrap();

        let days: Vec<u32> = metrics.iter().map(|m| m.day_diff).collect();
        assert_eq!(days, vec![7, 7, 20]);
        assert_eq!(metrics[0].option_type(), OptionType::Call);
        assert_eq!(metrics[1].option_type(), OptionType::Put);
    }

    #[test]
    fn test_bad_confidence_rejected() {
        let chain = OptionChain::new("XYZ", 100.0);
        let config = MetricsConfig { horizon_days: 30, confidence: 1.0 };
        let err = derive_metrics(&chain, 100.0, 0.3, now(), &config).unwrap_err();
        assert!(matches!(err, StatsError::Configuration(_)));
    }

    #[test]
    fn test_beyond_cone() {
        let mut chain = OptionChain::new("XYZ", 100.0);
        chain.add_contract(contract(OptionType::Call, 150.0, 30, 0.5));
        chain.add_contract(contract(OptionType::Call, 101.0, 30, 3.0));
        chain.add_contract(contract(OptionType::Put, 60.0, 30, 0.5));
        let metrics = derive_metrics(&chain, 100.0, 0.3, now(), &MetricsConfig::default()).unwrap();

        let beyond: Vec<f64> = metrics.iter().filter(|m| m.is_beyond_cone()).map(|m| m.strike()).collect();
        assert_eq!(beyond, vec![150.0, 60.0]);
    }
}
