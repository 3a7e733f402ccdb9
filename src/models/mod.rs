//! Price models
//!
//! Implements:
//! - Standard normal helpers (CDF, quantile)
//! - Probability cones and touch probability under lognormal diffusion
//! - GBM Monte Carlo terminal-price distribution

pub mod monte_carlo;
pub mod normal;
pub mod probability;

pub use monte_carlo::*;
pub use normal::*;
pub use probability::*;
