//! Estimator kinds and their per-bar terms
//!
//! Every estimator reduces bar `t` (with its predecessor `t - 1`) to one or
//! more terms, then reduces a trailing window of terms to a variance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{PriceBar, PriceField, StatsError, StatsResult};

/// Historical volatility estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// Close-to-close log returns
    LogReturns,
    /// Garman-Klass OHLC estimator
    GarmanKlass,
    /// Close-to-close with Hodges-Tompkins overlap bias correction
    HodgesTompkins,
    /// Parkinson high-low range estimator
    Parkinson,
    /// Rogers-Satchell drift-independent estimator
    RogersSatchell,
    /// Yang-Zhang overnight + open-to-close estimator
    YangZhang,
}

impl EstimatorKind {
    pub const ALL: [EstimatorKind; 6] = [
        EstimatorKind::LogReturns,
        EstimatorKind::GarmanKlass,
        EstimatorKind::HodgesTompkins,
        EstimatorKind::Parkinson,
        EstimatorKind::RogersSatchell,
        EstimatorKind::YangZhang,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EstimatorKind::LogReturns => "log_returns",
            EstimatorKind::GarmanKlass => "garman_klass",
            EstimatorKind::HodgesTompkins => "hodges_tompkins",
            EstimatorKind::Parkinson => "parkinson",
            EstimatorKind::RogersSatchell => "rogers_satchell",
            EstimatorKind::YangZhang => "yang_zhang",
        }
    }

    /// Bar fields that must be present and positive
    pub fn required_fields(&self) -> &'static [PriceField] {
        match self {
            EstimatorKind::LogReturns | EstimatorKind::HodgesTompkins => &[PriceField::Close],
            EstimatorKind::Parkinson => &[PriceField::High, PriceField::Low],
            EstimatorKind::GarmanKlass
            | EstimatorKind::RogersSatchell
            | EstimatorKind::YangZhang => &[
                PriceField::Open,
                PriceField::High,
                PriceField::Low,
                PriceField::Close,
            ],
        }
    }

    /// Reject bars missing a field the estimator reads
    ///
    /// Inconsistent ranges (a close printed above the high, say) are
    /// accepted; window variances are floored at zero instead.
    pub(crate) fn validate(&self, bars: &[PriceBar]) -> StatsResult<()> {
        for (i, bar) in bars.iter().enumerate() {
            for &field in self.required_fields() {
                let value = bar.get(field);
                if !value.is_finite() || value <= 0.0 {
                    return Err(StatsError::data(format!(
                        "{} estimator needs a positive '{}' value (bar {} has {})",
                        self.name(),
                        field.name(),
                        i,
                        value
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EstimatorKind {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        EstimatorKind::ALL
            .into_iter()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| StatsError::configuration(format!("Unknown estimator: {}", s)))
    }
}

/// ln(C_t / C_{t-1})
pub(crate) fn log_return(prev: &PriceBar, bar: &PriceBar) -> f64 {
    (bar.close / prev.close).ln()
}

/// 0.5·ln(H/L)² − (2ln2 − 1)·ln(C/O)²
pub(crate) fn garman_klass(bar: &PriceBar) -> f64 {
    let log_hl = (bar.high / bar.low).ln();
    let log_co = (bar.close / bar.open).ln();
    0.5 * log_hl * log_hl - (2.0 * std::f64::consts::LN_2 - 1.0) * log_co * log_co
}

/// ln(H/L)² / (4·ln2)
pub(crate) fn parkinson(bar: &PriceBar) -> f64 {
    let log_hl = (bar.high / bar.low).ln();
    log_hl * log_hl / (4.0 * std::f64::consts::LN_2)
}

/// ln(H/O)(ln(H/O) − ln(C/O)) + ln(L/O)(ln(L/O) − ln(C/O))
pub(crate) fn rogers_satchell(bar: &PriceBar) -> f64 {
    let log_ho = (bar.high / bar.open).ln();
    let log_lo = (bar.low / bar.open).ln();
    let log_co = (bar.close / bar.open).ln();
    log_ho * (log_ho - log_co) + log_lo * (log_lo - log_co)
}

/// ln(O_t / C_{t-1})²
pub(crate) fn overnight_sq(prev: &PriceBar, bar: &PriceBar) -> f64 {
    let x = (bar.open / prev.close).ln();
    x * x
}

/// Yang-Zhang weight on close-to-close variance for a window of `w`
pub(crate) fn yang_zhang_k(w: usize) -> f64 {
    let w = w as f64;
    0.34 / (1.34 + (w + 1.0) / (w - 1.0))
}

/// Hodges-Tompkins overlap correction for `h`-wide windows over `count` returns
pub(crate) fn hodges_tompkins_factor(h: usize, count: usize) -> StatsResult<f64> {
    let h = h as f64;
    let n = count as f64 - h + 1.0;
    let denom = 1.0 - h / n + (h * h - 1.0) / (3.0 * n * n);
    let factor = 1.0 / denom;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(StatsError::data(format!(
            "Hodges-Tompkins correction undefined for window {} over {} returns",
            h, count
        )));
    }
    Ok(factor)
}
