//! Historical volatility estimation
//!
//! Annualized rolling volatility from an OHLC price series under six
//! estimators. Output is aligned to the tail of the series: a series of `n`
//! bars and a window of `w` yields `n - w` values, with no leading gaps.
//!
//! ```rust
//! use option_stats::volatility::{estimate, EstimatorKind};
//! # use option_stats::core::{PriceBar, PriceSeries};
//! # use chrono::{Duration, TimeZone, Utc};
//! # let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! # let bars = [100.0, 101.0, 99.0, 102.0, 98.0, 103.0].iter().enumerate()
//! #     .map(|(i, &c)| PriceBar::new(t0 + Duration::days(i as i64), c, c, c, c, 0.0))
//! #     .collect();
//! # let series = PriceSeries::new(bars).unwrap();
//! let vol = estimate(&series, 3, EstimatorKind::LogReturns, 252).unwrap();
//! assert_eq!(vol.len(), 3);
//! let values: Vec<f64> = vol.iter().collect();
//! ```

mod estimators;
pub mod rolling;

pub use estimators::EstimatorKind;

use serde::{Deserialize, Serialize};

use crate::core::{PriceSeries, StatsError, StatsResult};
use estimators::{
    garman_klass, hodges_tompkins_factor, log_return, overnight_sq, parkinson, rogers_satchell,
    yang_zhang_k,
};
use rolling::{mean, sample_std, window_count, window_range, RunningSum};

/// Default number of trading periods per year
pub const TRADING_PERIODS: u32 = 252;

/// Volatility estimation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Trailing window in bars
    pub window: usize,
    pub estimator: EstimatorKind,
    /// Periods per year used for annualization
    pub trading_periods: u32,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            window: 30,
            estimator: EstimatorKind::LogReturns,
            trading_periods: TRADING_PERIODS,
        }
    }
}

/// Per-bar terms, one entry per bar after the first
#[derive(Debug, Clone)]
enum Terms {
    /// Close-to-close log returns, sample deviation per window
    Returns { returns: Vec<f64>, bias: f64 },
    /// Per-bar variance contribution, mean per window
    Variance(Vec<f64>),
    /// Yang-Zhang components, summed per window
    YangZhang {
        overnight: Vec<f64>,
        close: Vec<f64>,
        rs: Vec<f64>,
        k: f64,
    },
}

impl Terms {
    fn len(&self) -> usize {
        match self {
            Terms::Returns { returns, .. } => returns.len(),
            Terms::Variance(v) => v.len(),
            Terms::YangZhang { close, .. } => close.len(),
        }
    }
}

/// Rolling annualized volatility, computed lazily on iteration
///
/// Iterating twice recomputes from the stored per-bar terms.
#[derive(Debug, Clone)]
pub struct VolatilityEstimate {
    kind: EstimatorKind,
    window: usize,
    trading_periods: u32,
    terms: Terms,
}

impl VolatilityEstimate {
    pub fn kind(&self) -> EstimatorKind {
        self.kind
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of values the sequence yields
    pub fn len(&self) -> usize {
        window_count(self.terms.len(), self.window)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh iterator over the rolling values
    pub fn iter(&self) -> VolatilityIter<'_> {
        let sums = match &self.terms {
            Terms::YangZhang { overnight, close, rs, .. } => Some([
                RunningSum::new(overnight, self.window),
                RunningSum::new(close, self.window),
                RunningSum::new(rs, self.window),
            ]),
            _ => None,
        };
        VolatilityIter {
            estimate: self,
            pos: 0,
            sums,
        }
    }

    /// Value at window position `i`
    pub fn get(&self, i: usize) -> Option<f64> {
        if i >= self.len() {
            return None;
        }
        let range = window_range(i, self.window);
        let periods = self.trading_periods as f64;
        let value = match &self.terms {
            Terms::Returns { returns, bias } => {
                sample_std(&returns[range]) * periods.sqrt() * bias
            }
            // inconsistent bars can leave a window slightly negative
            Terms::Variance(v) => (periods * mean(&v[range]).max(0.0)).sqrt(),
            Terms::YangZhang { overnight, close, rs, k } => {
                let o: f64 = overnight[range.clone()].iter().sum();
                let c: f64 = close[range.clone()].iter().sum();
                let r: f64 = rs[range].iter().sum();
                self.yang_zhang(o, c, r, *k)
            }
        };
        Some(value)
    }

    /// Most recent value
    pub fn latest(&self) -> Option<f64> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    fn yang_zhang(&self, overnight_sum: f64, close_sum: f64, rs_sum: f64, k: f64) -> f64 {
        let scale = 1.0 / (self.window as f64 - 1.0);
        let variance = scale * (overnight_sum + k * close_sum + (1.0 - k) * rs_sum);
        // running sums drift below zero on flat windows, and inconsistent
        // bars can do so outright
        (self.trading_periods as f64 * variance.max(0.0)).sqrt()
    }
}

impl<'a> IntoIterator for &'a VolatilityEstimate {
    type Item = f64;
    type IntoIter = VolatilityIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`VolatilityEstimate`]
pub struct VolatilityIter<'a> {
    estimate: &'a VolatilityEstimate,
    pos: usize,
    sums: Option<[RunningSum<'a>; 3]>,
}

impl Iterator for VolatilityIter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.pos >= self.estimate.len() {
            return None;
        }
        let value = match (&mut self.sums, &self.estimate.terms) {
            (Some([o, c, r]), Terms::YangZhang { k, .. }) => {
                let (o, c, r) = (o.advance()?, c.advance()?, r.advance()?);
                self.estimate.yang_zhang(o, c, r, *k)
            }
            _ => self.estimate.get(self.pos)?,
        };
        self.pos += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.estimate.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for VolatilityIter<'_> {}

/// Rolling annualized volatility of `series`
///
/// Returns an empty estimate when the series has fewer than `window + 1`
/// bars. Fails with a data error when a bar lacks a field the estimator
/// needs, and with a configuration error for `window < 2` or zero
/// `trading_periods`.
pub fn estimate(
    series: &PriceSeries,
    window: usize,
    kind: EstimatorKind,
    trading_periods: u32,
) -> StatsResult<VolatilityEstimate> {
    if window < 2 {
        return Err(StatsError::configuration(format!(
            "volatility window must be at least 2, got {}",
            window
        )));
    }
    if trading_periods == 0 {
        return Err(StatsError::configuration("trading_periods must be positive"));
    }

    let bars = series.bars();
    kind.validate(bars)?;

    let terms = if bars.len() < window + 1 {
        tracing::debug!(
            estimator = %kind,
            bars = bars.len(),
            window,
            "not enough history, empty volatility estimate"
        );
        Terms::Variance(Vec::new())
    } else {
        build_terms(series, window, kind)?
    };

    let estimate = VolatilityEstimate {
        kind,
        window,
        trading_periods,
        terms,
    };
    tracing::debug!(estimator = %kind, window, values = estimate.len(), "volatility estimated");
    Ok(estimate)
}

fn build_terms(series: &PriceSeries, window: usize, kind: EstimatorKind) -> StatsResult<Terms> {
    let bars = series.bars();
    let pairs = || bars.windows(2).map(|p| (&p[0], &p[1]));

    let terms = match kind {
        EstimatorKind::LogReturns => Terms::Returns {
            returns: pairs().map(|(prev, bar)| log_return(prev, bar)).collect(),
            bias: 1.0,
        },
        EstimatorKind::HodgesTompkins => {
            let returns: Vec<f64> = pairs().map(|(prev, bar)| log_return(prev, bar)).collect();
            let bias = hodges_tompkins_factor(window, returns.len())?;
            Terms::Returns { returns, bias }
        }
        EstimatorKind::GarmanKlass => Terms::Variance(bars[1..].iter().map(garman_klass).collect()),
        EstimatorKind::Parkinson => Terms::Variance(bars[1..].iter().map(parkinson).collect()),
        EstimatorKind::RogersSatchell => {
            Terms::Variance(bars[1..].iter().map(rogers_satchell).collect())
        }
        EstimatorKind::YangZhang => Terms::YangZhang {
            overnight: pairs().map(|(prev, bar)| overnight_sq(prev, bar)).collect(),
            close: pairs()
                .map(|(prev, bar)| {
                    let r = log_return(prev, bar);
                    r * r
                })
                .collect(),
            rs: bars[1..].iter().map(rogers_satchell).collect(),
            k: yang_zhang_k(window),
        },
    };
    Ok(terms)
}

/// Every estimator over the same window, in [`EstimatorKind::ALL`] order
pub fn estimate_all(
    series: &PriceSeries,
    window: usize,
    trading_periods: u32,
) -> StatsResult<Vec<VolatilityEstimate>> {
    EstimatorKind::ALL
        .iter()
        .map(|&kind| estimate(series, window, kind, trading_periods))
        .collect()
}
