//! Option Metrics
//!
//! Derives per-contract economics from an option chain snapshot and
//! aggregates across the chain.
//!
//! Per contract:
//! - **Premium**: bid × multiplier, what a seller collects
//! - **ROI**: premium against the capital a strike ties up
//! - **Leverage**: exposure per unit of premium via delta
//! - **Probability of profit**: chance the strike is never touched
//! - **Cone bounds**: expected price range at the contract's expiry
//!
//! Across the chain:
//! - **Market pressure**: open-interest and volume weighted strikes per expiry
//! - **Skew screen**: OTM put vs call pricing with a liquidity check
//! - **Metrics table**: filtering, sorting and paging of derived rows

mod config;
mod derived;
mod pressure;
mod skew;
mod table;

pub use config::*;
pub use derived::*;
pub use pressure::*;
pub use skew::*;
pub use table::*;
