//! Skew and liquidity screen
//!
//! Compares the interpolated mid price of a call struck at 110% of spot
//! with a put struck at 90%, using the nearest listed strikes bracketing
//! both levels in a roughly one-month expiration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SkewConfig;
use crate::core::{
    ExpirationGroup, OptionChain, OptionContractSnapshot, OptionType, StatsError, StatsResult,
};
use crate::models::round_dp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkewCategory {
    PutSkew,
    CallSkew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Liquidity {
    Passed,
    Failed,
}

/// Outcome of the skew screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkewResult {
    pub category: SkewCategory,
    /// Richer side over cheaper side, rounded to 3 places
    pub ratio: f64,
    pub liquidity: Liquidity,
    /// Expiration the reference legs were taken from
    pub expiration: DateTime<Utc>,
    pub call_mid: f64,
    pub put_mid: f64,
}

/// Nearest strikes strictly below the put level and strictly above the call
/// level, for each side
#[derive(Debug, Clone, Copy)]
pub struct ReferenceLegs<'a> {
    pub low_call: &'a OptionContractSnapshot,
    pub high_call: &'a OptionContractSnapshot,
    pub low_put: &'a OptionContractSnapshot,
    pub high_put: &'a OptionContractSnapshot,
}

impl<'a> ReferenceLegs<'a> {
    /// Locate all four legs in one expiration group
    pub fn locate(group: &'a ExpirationGroup, put_level: f64, call_level: f64) -> Option<Self> {
        let bracket = |side: OptionType| {
            let contracts = group.side(side);
            let low = contracts.iter().rev().find(|c| c.strike < put_level)?;
            let high = contracts.iter().find(|c| c.strike > call_level)?;
            Some((low, high))
        };
        let (low_call, high_call) = bracket(OptionType::Call)?;
        let (low_put, high_put) = bracket(OptionType::Put)?;
        Some(Self { low_call, high_call, low_put, high_put })
    }

    fn all(&self) -> [&'a OptionContractSnapshot; 4] {
        [self.low_call, self.high_call, self.low_put, self.high_put]
    }
}

/// Linear interpolation of mid price at `strike` between two listed contracts
pub fn interpolate_mid(
    low: &OptionContractSnapshot,
    high: &OptionContractSnapshot,
    strike: f64,
) -> StatsResult<f64> {
    let width = high.strike - low.strike;
    if width.abs() < f64::EPSILON {
        return Err(StatsError::data(format!(
            "cannot interpolate between equal strikes {}",
            low.strike
        )));
    }
    Ok(low.mid() + (high.mid() - low.mid()) / width * (strike - low.strike))
}

/// Run the skew and liquidity screen on `chain`
///
/// Expirations with `min_days <= day_diff < max_days` are searched from the
/// latest down; the first one listing all four reference legs is used.
pub fn skew_screen(
    chain: &OptionChain,
    spot: f64,
    now: DateTime<Utc>,
    config: &SkewConfig,
) -> StatsResult<SkewResult> {
    if !(spot.is_finite() && spot > 0.0) {
        return Err(StatsError::data(format!("skew screen needs a positive spot, got {}", spot)));
    }
    let put_level = spot * config.put_moneyness;
    let call_level = spot * config.call_moneyness;

    let band = i64::from(config.min_days)..i64::from(config.max_days);
    let in_band: Vec<&ExpirationGroup> = chain
        .expirations
        .iter()
        .filter(|g| band.contains(&g.day_diff(now)))
        .collect();
    if in_band.is_empty() {
        return Err(StatsError::data(format!(
            "no {} expiration between {} and {} days out",
            chain.underlying, config.min_days, config.max_days
        )));
    }

    let (group, legs) = in_band
        .iter()
        .rev()
        .find_map(|g| ReferenceLegs::locate(g, put_level, call_level).map(|legs| (*g, legs)))
        .ok_or_else(|| {
            StatsError::data(format!(
                "could not locate strikes below {:.2} and above {:.2} for both calls and puts",
                put_level, call_level
            ))
        })?;
    tracing::debug!(
        expiration = %group.expiration,
        low_call = legs.low_call.strike,
        high_call = legs.high_call.strike,
        low_put = legs.low_put.strike,
        high_put = legs.high_put.strike,
        "skew reference legs"
    );

    let liquidity = if legs
        .all()
        .iter()
        .all(|c| c.ask_bid_ratio() > config.max_ask_bid_ratio)
    {
        Liquidity::Failed
    } else {
        Liquidity::Passed
    };

    let call_mid = interpolate_mid(legs.low_call, legs.high_call, call_level)?;
    let put_mid = interpolate_mid(legs.low_put, legs.high_put, put_level)?;
    if call_mid <= 0.0 || put_mid <= 0.0 {
        return Err(StatsError::data(format!(
            "interpolated mids must be positive (call {:.4}, put {:.4})",
            call_mid, put_mid
        )));
    }

    let (category, ratio) = if put_mid > call_mid {
        (SkewCategory::PutSkew, put_mid / call_mid)
    } else {
        (SkewCategory::CallSkew, call_mid / put_mid)
    };

    Ok(SkewResult {
        category,
        ratio: round_dp(ratio, 3),
        liquidity,
        expiration: group.expiration,
        call_mid,
        put_mid,
    })
}
