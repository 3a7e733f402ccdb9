//! Market-pressure aggregates
//!
//! Open-interest and volume weighted average strikes per expiration: where
//! positioning is concentrated, and so where dealer hedging flows cluster.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::DerivedOptionMetric;
use crate::core::OptionType;

/// Concentration signal for one expiration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPressure {
    pub day_diff: u32,
    /// Calendar date `day_diff` days after the snapshot
    pub date: NaiveDate,
    pub total_open_interest: u64,
    pub total_volume: u64,
    /// Σ(strike·OI) / Σ(OI); `None` without open interest
    pub oi_weighted_strike: Option<f64>,
    /// Σ(strike·volume) / Σ(volume); `None` without volume
    pub volume_weighted_strike: Option<f64>,
}

/// Pressure index per expiration day, calls and puts combined
pub fn market_pressure(metrics: &[DerivedOptionMetric], now: DateTime<Utc>) -> Vec<MarketPressure> {
    #[derive(Default)]
    struct Acc {
        oi: u64,
        volume: u64,
        strike_oi: f64,
        strike_volume: f64,
    }

    let mut by_day: BTreeMap<u32, Acc> = BTreeMap::new();
    for m in metrics {
        let acc = by_day.entry(m.day_diff).or_default();
        let c = &m.contract;
        acc.oi += c.open_interest;
        acc.volume += c.volume;
        acc.strike_oi += c.strike * c.open_interest as f64;
        acc.strike_volume += c.strike * c.volume as f64;
    }

    let today = now.date_naive();
    by_day
        .into_iter()
        .map(|(day_diff, acc)| MarketPressure {
            day_diff,
            date: today + Duration::days(i64::from(day_diff)),
            total_open_interest: acc.oi,
            total_volume: acc.volume,
            oi_weighted_strike: (acc.oi > 0).then(|| acc.strike_oi / acc.oi as f64),
            volume_weighted_strike: (acc.volume > 0).then(|| acc.strike_volume / acc.volume as f64),
        })
        .collect()
}

/// Volume and open interest at one strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeActivity {
    pub option_type: OptionType,
    pub strike: f64,
    pub volume: u64,
    pub open_interest: u64,
}

/// Strike-by-strike activity for the expiration `day_diff` days out,
/// calls then puts, each by ascending strike
pub fn strike_activity(metrics: &[DerivedOptionMetric], day_diff: u32) -> Vec<StrikeActivity> {
    let mut rows: Vec<StrikeActivity> = metrics
        .iter()
        .filter(|m| m.day_diff == day_diff)
        .map(|m| StrikeActivity {
            option_type: m.contract.option_type,
            strike: m.contract.strike,
            volume: m.contract.volume,
            open_interest: m.contract.open_interest,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.option_type
            .cmp(&b.option_type)
            .then(a.strike.total_cmp(&b.strike))
    });
    rows
}

/// Distinct day_diffs present in `metrics`, ascending
pub fn expiration_days(metrics: &[DerivedOptionMetric]) -> Vec<u32> {
    let mut days: Vec<u32> = metrics.iter().map(|m| m.day_diff).collect();
    days.sort_unstable();
    days.dedup();
    days
}
