//! Core data types
//!
//! Defines fundamental types:
//! - PriceBar / PriceSeries: OHLCV history of the underlying
//! - OptionContractSnapshot / OptionChain: option chain snapshot
//! - SpotQuote: underlying quote
//! - StatsError: error taxonomy

pub mod error;
pub mod option;
pub mod price;
pub mod quote;

pub use error::*;
pub use option::*;
pub use price::*;
pub use quote::*;
