//! Market data input and storage
//!
//! Handles:
//! - Provider-shaped snapshot payloads (history, quotes, option chain)
//! - Reading snapshots from JSON files
//! - Local caching of snapshots

pub mod cache;
pub mod snapshot;

pub use cache::*;
pub use snapshot::*;

use std::fs;
use std::path::PathBuf;

use crate::core::StatsResult;

/// Anything that can supply a point-in-time snapshot for a symbol
pub trait MarketDataSource {
    fn snapshot(&self, symbol: &str) -> StatsResult<MarketSnapshot>;
}

/// Snapshots stored as `<dir>/<SYMBOL>.json`
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MarketDataSource for JsonFileSource {
    fn snapshot(&self, symbol: &str) -> StatsResult<MarketSnapshot> {
        let path = self.dir.join(format!("{}.json", symbol));
        let json = fs::read_to_string(&path)?;
        tracing::debug!("Read snapshot for {} from {:?}", symbol, path);
        MarketSnapshot::from_json_str(&json)
    }
}
