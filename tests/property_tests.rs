//! Property-based tests using proptest.
//!
//! Invariants of the estimators and probability models across random inputs.

use chrono::{Duration, TimeZone, Utc};
use option_stats::core::{PriceBar, PriceSeries, StatsError};
use option_stats::models::{bin_prices, probability_cone, touch_probability};
use option_stats::volatility::{estimate, EstimatorKind};
use proptest::prelude::*;

/// Consistent OHLC bars from a sequence of close-to-close returns
fn series_from_returns(returns: &[f64], wick: f64) -> PriceSeries {
    let t0 = Utc.with_ymd_and_hms(2023, 1, 2, 21, 0, 0).unwrap();
    let mut close = 100.0_f64;
    let mut bars = vec![PriceBar::new(t0, close, close * (1.0 + wick), close * (1.0 - wick), close, 1e5)];
    for (i, r) in returns.iter().enumerate() {
        let open = close * (1.0 + r / 4.0);
        close *= r.exp();
        let high = open.max(close) * (1.0 + wick);
        let low = open.min(close) * (1.0 - wick);
        bars.push(PriceBar::new(t0 + Duration::days(i as i64 + 1), open, high, low, close, 1e5));
    }
    PriceSeries::new(bars).unwrap()
}

// --- Estimator output length and range ---

proptest! {
    /// Every estimator yields `n - window` finite, non-negative values, or
    /// nothing at all when the history is too short.
    #[test]
    fn estimator_length_and_range(
        returns in prop::collection::vec(-0.05_f64..0.05, 1..80),
        window in 2_usize..25,
        wick in 0.0_f64..0.02,
    ) {
        let series = series_from_returns(&returns, wick);
        let n = series.len();

        for kind in EstimatorKind::ALL {
            match estimate(&series, window, kind, 252) {
                Ok(est) => {
                    let expected = n.saturating_sub(window);
                    prop_assert_eq!(est.len(), expected, "{} length", kind);
                    for v in est.iter() {
                        prop_assert!(v.is_finite() && v >= 0.0, "{} produced {}", kind, v);
                    }
                    prop_assert_eq!(est.iter().count(), est.len());
                }
                // the Hodges-Tompkins correction is undefined for some short histories
                Err(StatsError::Data(_)) if kind == EstimatorKind::HodgesTompkins => {}
                Err(e) => prop_assert!(false, "{} failed: {}", kind, e),
            }
        }
    }
}

// --- Probability cone ---

proptest! {
    /// Bounds straddle spot symmetrically, up to rounding to cents.
    #[test]
    fn cone_is_symmetric_about_spot(
        spot in 1.0_f64..1_000.0,
        vol in 0.01_f64..1.5,
        days in 0_u32..400,
        confidence in 0.05_f64..0.95,
    ) {
        let (lower, upper) = probability_cone(spot, vol, days, confidence).unwrap();
        prop_assert!(lower <= spot + 0.005 && spot <= upper + 0.005);
        prop_assert!(((upper - spot) - (spot - lower)).abs() < 0.011, "{} {} {}", lower, spot, upper);
    }

    /// Wider confidence never narrows the cone.
    #[test]
    fn cone_widens_with_confidence(
        spot in 10.0_f64..500.0,
        vol in 0.05_f64..1.0,
        days in 1_u32..200,
        low in 0.1_f64..0.5,
        extra in 0.05_f64..0.45,
    ) {
        let (l1, u1) = probability_cone(spot, vol, days, low).unwrap();
        let (l2, u2) = probability_cone(spot, vol, days, low + extra).unwrap();
        prop_assert!(l2 <= l1 && u2 >= u1);
    }
}

// --- Touch probability and binning ---

proptest! {
    #[test]
    fn touch_probability_is_a_probability(
        spot in 1.0_f64..1_000.0,
        strike in 1.0_f64..1_000.0,
        vol in 0.0_f64..2.0,
        days in 0_u32..500,
    ) {
        let p = touch_probability(spot, strike, vol, days);
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn histogram_sums_to_one_hundred(
        prices in prop::collection::vec(1.0_f64..500.0, 1..500),
        width in 0.5_f64..50.0,
    ) {
        let bins = bin_prices(&prices, width).unwrap();
        let total: f64 = bins.iter().map(|b| b.probability_pct).sum();
        prop_assert!((total - 100.0).abs() < 1e-6);
        for pair in bins.windows(2) {
            prop_assert!((pair[1].center - pair[0].center - width).abs() < 1e-6);
        }
    }
}
