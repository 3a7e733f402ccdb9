//! Local snapshot caching
//!
//! Stores market snapshots as JSON so analysis can be repeated offline and
//! the provider is not queried on every run.

use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::PathBuf;

use super::{MarketDataSource, MarketSnapshot};
use crate::core::StatsResult;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age before refresh (in hours)
    pub max_age_hours: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            max_age_hours: 24,
            enabled: true,
        }
    }
}

/// Snapshot cache manager
pub struct DataCache {
    config: CacheConfig,
}

impl DataCache {
    pub fn new(config: CacheConfig) -> StatsResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    fn cache_path(&self, symbol: &str) -> PathBuf {
        self.config.cache_dir.join(format!("{}_snapshot.json", symbol))
    }

    /// Cached file exists and is younger than `max_age_hours`
    pub fn is_valid(&self, symbol: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let modified = fs::metadata(self.cache_path(symbol)).and_then(|m| m.modified());
        match modified {
            Ok(modified) => {
                let modified: DateTime<Utc> = modified.into();
                Utc::now() - modified < Duration::hours(self.config.max_age_hours)
            }
            Err(_) => false,
        }
    }

    pub fn save(&self, snapshot: &MarketSnapshot) -> StatsResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.cache_path(&snapshot.symbol);
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json)?;

        tracing::info!("Cached snapshot for {} at {:?}", snapshot.symbol, path);
        Ok(())
    }

    /// Fresh cached snapshot, or `None` on a miss
    pub fn load(&self, symbol: &str) -> StatsResult<Option<MarketSnapshot>> {
        if !self.is_valid(symbol) {
            tracing::debug!("Cache miss for {}", symbol);
            return Ok(None);
        }

        let json = fs::read_to_string(self.cache_path(symbol))?;
        let snapshot = MarketSnapshot::from_json_str(&json)?;

        tracing::info!("Loaded snapshot for {} from cache", symbol);
        Ok(Some(snapshot))
    }

    /// Remove the cached snapshot for a symbol, if any
    pub fn clear(&self, symbol: &str) -> StatsResult<()> {
        let path = self.cache_path(symbol);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn clear_all(&self) -> StatsResult<()> {
        if self.config.cache_dir.exists() {
            fs::remove_dir_all(&self.config.cache_dir)?;
            fs::create_dir_all(&self.config.cache_dir)?;
        }
        Ok(())
    }

    /// Symbols with a cached snapshot, sorted
    pub fn list_cached(&self) -> StatsResult<Vec<String>> {
        let mut symbols = Vec::new();

        if !self.config.cache_dir.exists() {
            return Ok(symbols);
        }

        for entry in fs::read_dir(&self.config.cache_dir)? {
            let file_name = entry?.file_name().to_string_lossy().to_string();
            if let Some(symbol) = file_name.strip_suffix("_snapshot.json") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Cache in front of another data source
pub struct CachedSource<S> {
    cache: DataCache,
    source: S,
}

impl<S: MarketDataSource> CachedSource<S> {
    pub fn new(config: CacheConfig, source: S) -> StatsResult<Self> {
        Ok(Self {
            cache: DataCache::new(config)?,
            source,
        })
    }

    /// Drop the cached copy and fetch again
    pub fn refresh(&self, symbol: &str) -> StatsResult<MarketSnapshot> {
        self.cache.clear(symbol)?;
        self.snapshot(symbol)
    }
}

impl<S: MarketDataSource> MarketDataSource for CachedSource<S> {
    fn snapshot(&self, symbol: &str) -> StatsResult<MarketSnapshot> {
        if let Some(snapshot) = self.cache.load(symbol)? {
            return Ok(snapshot);
        }

        tracing::info!("Fetching fresh snapshot for {}", symbol);
        let snapshot = self.source.snapshot(symbol)?;
        self.cache.save(&snapshot)?;

        Ok(snapshot)
    }
}
