//! Underlying price history
//!
//! OHLCV bars as delivered by the market-data provider, and the ordered
//! series the volatility estimators consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{StatsError, StatsResult};

/// A single OHLCV bar
///
/// Missing price fields deserialize to zero; estimators that need a field
/// reject zero values with a data error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time
    #[serde(rename = "datetime", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self { timestamp, open, high, low, close, volume }
    }

    /// Read one field of the bar
    pub fn get(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volume => self.volume,
        }
    }
}

/// Column selector for a price bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub fn name(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        }
    }
}

/// Ordered price history with strictly increasing timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps
    pub fn new(bars: Vec<PriceBar>) -> StatsResult<Self> {
        if let Some(pos) = bars
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(StatsError::data(format!(
                "price bars must have strictly increasing timestamps (bar {} at {} follows {})",
                pos + 1,
                bars[pos + 1].timestamp,
                bars[pos].timestamp
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Extract one column as a vector
    pub fn field(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| b.get(field)).collect()
    }

    /// Most recent close
    pub fn last_close(&self) -> StatsResult<f64> {
        self.bars
            .last()
            .map(|b| b.close)
            .ok_or_else(|| StatsError::data("price series is empty"))
    }

    /// Fail with `InsufficientHistory` unless a `window` estimate has output
    pub fn ensure_history(&self, window: usize) -> StatsResult<()> {
        let required = window + 1;
        if self.bars.len() < required {
            return Err(StatsError::InsufficientHistory {
                required,
                available: self.bars.len(),
            });
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bars = Vec::<PriceBar>::deserialize(deserializer)?;
        PriceSeries::new(bars).map_err(serde::de::Error::custom)
    }
}
