//! Lognormal-diffusion price ranges
//!
//! Probability cones bound where the underlying is expected to trade at a
//! given confidence after `days`; touch probability estimates the chance of
//! reaching a strike before then. Both annualize over 252 trading days while
//! callers count calendar days, matching the reference dashboard.

use serde::{Deserialize, Serialize};

use super::normal::{norm_cdf, norm_ppf, round_dp};
use crate::core::{StatsError, StatsResult};
use crate::volatility::TRADING_PERIODS;

/// Price range at one horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityConeResult {
    pub horizon_days: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: f64,
}

pub(crate) fn check_confidence(confidence: f64) -> StatsResult<()> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(StatsError::configuration(format!(
            "confidence must lie strictly between 0 and 1, got {}",
            confidence
        )))
    }
}

/// Lower and upper price bounds at `confidence` after `days`
///
/// Bounds are symmetric about `spot` and rounded to cents; `days = 0`
/// collapses the cone to `(spot, spot)`.
pub fn probability_cone(
    spot: f64,
    volatility: f64,
    days: u32,
    confidence: f64,
) -> StatsResult<(f64, f64)> {
    check_confidence(confidence)?;
    if !spot.is_finite() || !volatility.is_finite() || volatility < 0.0 {
        return Err(StatsError::data(format!(
            "cone needs a finite spot and non-negative volatility (spot {}, vol {})",
            spot, volatility
        )));
    }

    let z = norm_ppf(1.0 - (1.0 - confidence) / 2.0);
    let std_dev = z * spot * volatility * (days as f64 / TRADING_PERIODS as f64).sqrt();
    Ok((round_dp(spot - std_dev, 2), round_dp(spot + std_dev, 2)))
}

/// [`probability_cone`] packaged with its horizon and confidence
pub fn cone_at(
    spot: f64,
    volatility: f64,
    days: u32,
    confidence: f64,
) -> StatsResult<ProbabilityConeResult> {
    let (lower_bound, upper_bound) = probability_cone(spot, volatility, days, confidence)?;
    Ok(ProbabilityConeResult {
        horizon_days: days,
        lower_bound,
        upper_bound,
        confidence,
    })
}

/// Cone for every day in `0..=max_days`
pub fn cone_series(
    spot: f64,
    volatility: f64,
    max_days: u32,
    confidence: f64,
) -> StatsResult<Vec<ProbabilityConeResult>> {
    (0..=max_days)
        .map(|days| cone_at(spot, volatility, days, confidence))
        .collect()
}

/// Touch probability for `strike` over `days`
///
/// `2·Φ(z) − 1` with `z` the spot-to-strike distance in standard deviations
/// of the move over `days`. It grows with distance, so for a written option
/// it reads as the probability of keeping the premium.
///
/// Returns 0.0 when any input is zero or non-finite; that is a defined
/// result, not an error.
pub fn touch_probability(spot: f64, strike: f64, volatility: f64, days: u32) -> f64 {
    let missing = |x: f64| x == 0.0 || !x.is_finite();
    if missing(spot) || missing(strike) || missing(volatility) || days == 0 {
        return 0.0;
    }

    let z = (spot - strike).abs()
        / (spot * volatility * (days as f64 / TRADING_PERIODS as f64).sqrt());
    (2.0 * norm_cdf(z) - 1.0).clamp(0.0, 1.0)
}
