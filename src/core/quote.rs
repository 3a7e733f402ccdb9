//! Underlying spot quote

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last/bid/ask quote for an underlying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    pub symbol: String,
    pub last_price: f64,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl SpotQuote {
    pub fn new(symbol: impl Into<String>, last_price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price,
            bid: None,
            ask: None,
            timestamp,
        }
    }

    /// Bid-ask spread
    pub fn spread(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some(a - b),
            _ => None,
        }
    }
}
