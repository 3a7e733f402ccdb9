//! Geometric Brownian Motion terminal-price simulation
//!
//! S_T = S_0 · exp((r − q − σ²/2)·T + σ·√T·Z)
//!
//! Paths are independent, so they are simulated in fixed-size chunks on the
//! rayon pool. Each chunk draws from its own ChaCha stream of a common seed,
//! which keeps seeded runs reproducible regardless of thread count.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{StatsError, StatsResult};

const CHUNK_PATHS: usize = 1 << 16;
/// Largest histogram `bin_prices` will build
pub const MAX_BINS: usize = 100_000;

/// Simulation settings that do not depend on the underlying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Risk-free rate (annualized)
    pub rate: f64,
    /// Dividend yield (annualized)
    pub dividend_yield: f64,
    /// Sub-periods per path; 1 uses the closed form
    pub steps: usize,
    /// Number of simulated paths
    pub paths: usize,
    /// Histogram bin width in price units
    pub bin_width: f64,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rate: 0.01,
            dividend_yield: 0.007,
            steps: 1,
            paths: 1_000_000,
            bin_width: 10.0,
            seed: None,
        }
    }
}

/// Full GBM simulation input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmParams {
    /// Initial price S_0
    pub spot: f64,
    /// Horizon in years
    pub time: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    /// Annualized volatility σ
    pub volatility: f64,
    pub steps: usize,
    pub paths: usize,
    pub bin_width: f64,
    pub seed: Option<u64>,
}

impl GbmParams {
    /// Combine an underlying with simulation settings
    pub fn from_config(spot: f64, time: f64, volatility: f64, config: &SimulationConfig) -> Self {
        Self {
            spot,
            time,
            rate: config.rate,
            dividend_yield: config.dividend_yield,
            volatility,
            steps: config.steps,
            paths: config.paths,
            bin_width: config.bin_width,
            seed: config.seed,
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> StatsResult<()> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            return Err(StatsError::data("spot must be positive"));
        }
        if !(self.time.is_finite() && self.time >= 0.0) {
            return Err(StatsError::data("time horizon must be non-negative"));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(StatsError::data("volatility must be non-negative"));
        }
        if !self.rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(StatsError::data("rate and dividend yield must be finite"));
        }
        if self.steps == 0 {
            return Err(StatsError::configuration("steps must be at least 1"));
        }
        if self.paths == 0 {
            return Err(StatsError::configuration("paths must be at least 1"));
        }
        if !(self.bin_width.is_finite() && self.bin_width > 0.0) {
            return Err(StatsError::configuration("bin width must be positive"));
        }
        Ok(())
    }

    /// Analytical mean of S_T
    pub fn expected_terminal(&self) -> f64 {
        self.spot * ((self.rate - self.dividend_yield) * self.time).exp()
    }

    fn simulate_chunk(&self, seed: u64, chunk: usize, n: usize) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(chunk as u64);

        let dt = self.time / self.steps as f64;
        let drift = (self.rate - self.dividend_yield - 0.5 * self.volatility * self.volatility) * dt;
        let diffusion = self.volatility * dt.sqrt();

        (0..n)
            .map(|_| {
                let log_return: f64 = (0..self.steps)
                    .map(|_| {
                        let z: f64 = StandardNormal.sample(&mut rng);
                        drift + diffusion * z
                    })
                    .sum();
                self.spot * log_return.exp()
            })
            .collect()
    }
}

/// One histogram bin of the simulated distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBin {
    pub center: f64,
    /// Share of paths ending in the bin, in percent
    pub probability_pct: f64,
}

/// Binned terminal-price distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceDistribution {
    /// Bins by ascending center, covering the simulated range
    pub bins: Vec<PriceBin>,
    /// Sample mean of the simulated prices
    pub mean: f64,
    pub paths: usize,
}

/// Simulate `params.paths` terminal prices, concatenated in chunk order
pub fn simulate_terminal_prices(params: &GbmParams) -> StatsResult<Vec<f64>> {
    params.validate()?;

    let seed = params.seed.unwrap_or_else(rand::random);
    let chunks = params.paths.div_ceil(CHUNK_PATHS);
    tracing::debug!(
        paths = params.paths,
        steps = params.steps,
        chunks,
        seeded = params.seed.is_some(),
        "simulating GBM terminal prices"
    );

    let prices: Vec<f64> = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let n = CHUNK_PATHS.min(params.paths - chunk * CHUNK_PATHS);
            params.simulate_chunk(seed, chunk, n)
        })
        .collect::<Vec<Vec<f64>>>()
        .concat();

    if let Some(bad) = prices.iter().find(|p| !p.is_finite()) {
        return Err(StatsError::data(format!(
            "simulation produced a non-finite price ({}); volatility or horizon too large",
            bad
        )));
    }
    Ok(prices)
}

/// Histogram of `prices` with bins of `bin_width`, in percent of all prices
///
/// Bins are aligned to multiples of `bin_width` and run contiguously from
/// the lowest to the highest price, empty bins included.
pub fn bin_prices(prices: &[f64], bin_width: f64) -> StatsResult<Vec<PriceBin>> {
    if prices.is_empty() {
        return Err(StatsError::data("no prices to bin"));
    }
    if !(bin_width.is_finite() && bin_width > 0.0) {
        return Err(StatsError::configuration("bin width must be positive"));
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let origin = (min / bin_width).floor() * bin_width;
    let span = ((max - origin) / bin_width).floor();
    if span >= MAX_BINS as f64 {
        return Err(StatsError::configuration(format!(
            "bin width {} splits the range {:.2}..{:.2} into more than {} bins",
            bin_width, min, max, MAX_BINS
        )));
    }
    let n_bins = span as usize + 1;

    let mut counts = vec![0usize; n_bins];
    for &p in prices {
        let idx = (((p - origin) / bin_width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }

    let total = prices.len() as f64;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| PriceBin {
            center: origin + (i as f64 + 0.5) * bin_width,
            probability_pct: count as f64 / total * 100.0,
        })
        .collect())
}

/// Simulate and bin in one call
pub fn simulate_distribution(params: &GbmParams) -> StatsResult<PriceDistribution> {
    let prices = simulate_terminal_prices(params)?;
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    let bins = bin_prices(&prices, params.bin_width)?;
    Ok(PriceDistribution {
        bins,
        mean,
        paths: prices.len(),
    })
}
