//! Provider-shaped market snapshots
//!
//! The market-data provider returns three payloads per symbol: price history
//! (`candles`), a quote map keyed by symbol, and an option chain nested
//! expiration-then-strike. These types mirror those payloads and convert
//! them into the core types the analytics consume.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{
    OptionChain, OptionContractSnapshot, OptionType, PriceBar, PriceSeries, SpotQuote, StatsError,
    StatsResult,
};

/// `{"candles": [...]}` price history payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryResponse {
    #[serde(default)]
    pub candles: Vec<PriceBar>,
}

impl PriceHistoryResponse {
    pub fn into_series(self) -> StatsResult<PriceSeries> {
        PriceSeries::new(self.candles)
    }
}

/// One entry of the quote map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEntry {
    pub last_price: f64,
    #[serde(default)]
    pub bid_price: Option<f64>,
    #[serde(default)]
    pub ask_price: Option<f64>,
}

/// `{SYMBOL: {lastPrice, bidPrice, askPrice}}` quote payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteResponse(pub HashMap<String, QuoteEntry>);

impl QuoteResponse {
    /// Quote for `symbol`, stamped with `timestamp`
    pub fn quote(&self, symbol: &str, timestamp: DateTime<Utc>) -> StatsResult<SpotQuote> {
        let entry = self
            .0
            .get(symbol)
            .ok_or_else(|| StatsError::data(format!("no quote for {}", symbol)))?;
        if !(entry.last_price.is_finite() && entry.last_price > 0.0) {
            return Err(StatsError::data(format!(
                "quote for {} has invalid last price {}",
                symbol, entry.last_price
            )));
        }
        let mut quote = SpotQuote::new(symbol, entry.last_price, timestamp);
        quote.bid = entry.bid_price;
        quote.ask = entry.ask_price;
        Ok(quote)
    }
}

/// A contract as listed in `callExpDateMap`/`putExpDateMap`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderContract {
    #[serde(default)]
    pub put_call: Option<OptionType>,
    pub strike_price: f64,
    /// Epoch milliseconds
    pub expiration_date: i64,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default)]
    pub bid_size: u64,
    #[serde(default)]
    pub ask_size: u64,
    /// Numeric, `"NaN"` or null upstream
    #[serde(default, deserialize_with = "lenient_number")]
    pub delta: Option<f64>,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub open_interest: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default)]
    pub symbol: Option<String>,
}

fn default_multiplier() -> f64 {
    100.0
}

/// Accept a number, a numeric string, or anything else as absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|x| x.is_finite()))
}

impl ProviderContract {
    fn to_snapshot(&self, side: OptionType) -> StatsResult<OptionContractSnapshot> {
        let option_type = self.put_call.unwrap_or(side);
        if option_type != side {
            return Err(StatsError::data(format!(
                "{} contract at strike {} listed under the {} map",
                option_type.label(),
                self.strike_price,
                side.label()
            )));
        }
        let expiration = DateTime::from_timestamp_millis(self.expiration_date).ok_or_else(|| {
            StatsError::data(format!("invalid expiration timestamp {}", self.expiration_date))
        })?;
        Ok(OptionContractSnapshot {
            option_type,
            strike: self.strike_price,
            expiration,
            bid: self.bid,
            ask: self.ask,
            delta: self.delta,
            volume: self.volume,
            open_interest: self.open_interest,
            multiplier: self.multiplier,
            bid_size: self.bid_size,
            ask_size: self.ask_size,
            symbol: self.symbol.clone(),
        })
    }
}

/// `"YYYY-MM-DD:days"` → strike string → contracts
pub type ExpirationDateMap = BTreeMap<String, BTreeMap<String, Vec<ProviderContract>>>;

/// Option chain payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainResponse {
    #[serde(default)]
    pub underlying_price: Option<f64>,
    #[serde(default)]
    pub call_exp_date_map: ExpirationDateMap,
    #[serde(default)]
    pub put_exp_date_map: ExpirationDateMap,
}

impl OptionChainResponse {
    /// Flatten both maps into an [`OptionChain`]
    ///
    /// Map keys are informational only; each contract carries its own
    /// expiration timestamp and strike.
    pub fn to_chain(&self, underlying: &str) -> StatsResult<OptionChain> {
        let mut chain = OptionChain::new(underlying, self.underlying_price.unwrap_or(0.0));
        for (side, map) in [
            (OptionType::Call, &self.call_exp_date_map),
            (OptionType::Put, &self.put_exp_date_map),
        ] {
            for contract in map.values().flat_map(|strikes| strikes.values()).flatten() {
                chain.add_contract(contract.to_snapshot(side)?);
            }
        }
        tracing::debug!(
            underlying,
            expirations = chain.expirations.len(),
            contracts = chain.len(),
            "parsed option chain"
        );
        Ok(chain)
    }
}

/// Everything the analytics need for one symbol at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    /// When the payloads were captured; day counts are taken from here
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
    pub history: PriceHistoryResponse,
    pub quotes: QuoteResponse,
    pub chain: OptionChainResponse,
}

impl MarketSnapshot {
    pub fn from_json_str(json: &str) -> StatsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn series(&self) -> StatsResult<PriceSeries> {
        self.history.clone().into_series()
    }

    pub fn quote(&self) -> StatsResult<SpotQuote> {
        self.quotes.quote(&self.symbol, self.captured_at)
    }

    pub fn option_chain(&self) -> StatsResult<OptionChain> {
        self.chain.to_chain(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_JSON: &str = r#"{
        "underlyingPrice": 101.5,
        "callExpDateMap": {
            "2024-06-21:30": {
                "105.0": [{"putCall": "CALL", "strikePrice": 105.0, "expirationDate": 1718985600000,
                           "bid": 1.2, "ask": 1.3, "bidSize": 10, "askSize": 12, "delta": 0.31,
                           "volume": 150, "openInterest": 900, "multiplier": 100}],
                "100.0": [{"putCall": "CALL", "strikePrice": 100.0, "expirationDate": 1718985600000,
                           "bid": 3.1, "ask": 3.3, "delta": "NaN"}]
            }
        },
        "putExpDateMap": {
            "2024-06-21:30": {
                "95.0": [{"putCall": "PUT", "strikePrice": 95.0, "expirationDate": 1718985600000,
                          "bid": 0.8, "ask": 0.9, "delta": null}]
            }
        }
    }"#;

    #[test]
    fn test_chain_conversion() {
        let response: OptionChainResponse = serde_json::from_str(CHAIN_JSON).unwrap();
        let chain = response.to_chain("XYZ").unwrap();

        assert_eq!(chain.underlying_price, 101.5);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.expirations.len(), 1);

        let group = &chain.expirations[0];
        let strikes: Vec<f64> = group.calls.iter().map(|c| c.strike).collect();
        assert_eq!(strikes, vec![100.0, 105.0]);
        assert_eq!(group.calls[0].delta, None);
        assert_eq!(group.calls[0].multiplier, 100.0);
        assert_eq!(group.calls[1].delta, Some(0.31));
        assert_eq!(group.calls[1].open_interest, 900);
        assert_eq!(group.calls[1].bid_size, 10);
        assert_eq!(group.puts[0].delta, None);
    }

    #[test]
    fn test_mismatched_side_rejected() {
        let json = r#"{"callExpDateMap": {"2024-06-21:30": {"95.0": [
            {"putCall": "PUT", "strikePrice": 95.0, "expirationDate": 1718985600000}
        ]}}}"#;
        let response: OptionChainResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.to_chain("XYZ"), Err(StatsError::Data(_))));
    }

    #[test]
    fn test_quote_lookup() {
        let json = r#"{"XYZ": {"lastPrice": 101.5, "bidPrice": 101.4, "askPrice": 101.6}}"#;
        let quotes: QuoteResponse = serde_json::from_str(json).unwrap();
        let quote = quotes.quote("XYZ", Utc::now()).unwrap();
        assert_eq!(quote.last_price, 101.5);
        assert!((quote.spread().unwrap() - 0.2).abs() < 1e-9);

        assert!(quotes.quote("ABC", Utc::now()).is_err());
    }

    #[test]
    fn test_history_conversion() {
        let json = r#"{"candles": [
            {"open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10, "datetime": 1704067200000},
            {"open": 1.5, "high": 2.1, "low": 1.1, "close": 1.9, "volume": 12, "datetime": 1704153600000}
        ]}"#;
        let history: PriceHistoryResponse = serde_json::from_str(json).unwrap();
        let series = history.into_series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_close().unwrap(), 1.9);
    }
}
