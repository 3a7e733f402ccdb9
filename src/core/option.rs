//! Option contract snapshots
//!
//! Point-in-time option chain data: one snapshot per listed contract,
//! grouped by expiration and ordered by strike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Provider label ("CALL"/"PUT")
    pub fn label(&self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }
}

/// Whole calendar days from `now` until `expiration`, floored
///
/// A contract expiring later today is 0 days out; one that expired an hour
/// ago is -1.
pub fn day_diff(now: DateTime<Utc>, expiration: DateTime<Utc>) -> i64 {
    (expiration - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Market snapshot of a single listed contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContractSnapshot {
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: DateTime<Utc>,
    pub bid: f64,
    pub ask: f64,
    /// Provider delta; `None` when the provider sent a non-numeric value
    pub delta: Option<f64>,
    pub volume: u64,
    pub open_interest: u64,
    /// Shares per contract (100 for US equity options)
    pub multiplier: f64,
    pub bid_size: u64,
    pub ask_size: u64,
    /// Contract symbol (provider-specific)
    pub symbol: Option<String>,
}

impl OptionContractSnapshot {
    /// Snapshot with the given quote and empty activity fields
    pub fn new(
        option_type: OptionType,
        strike: f64,
        expiration: DateTime<Utc>,
        bid: f64,
        ask: f64,
    ) -> Self {
        Self {
            option_type,
            strike,
            expiration,
            bid,
            ask,
            delta: None,
            volume: 0,
            open_interest: 0,
            multiplier: 100.0,
            bid_size: 0,
            ask_size: 0,
            symbol: None,
        }
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn with_activity(mut self, volume: u64, open_interest: u64) -> Self {
        self.volume = volume;
        self.open_interest = open_interest;
        self
    }

    /// Mid price
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Ask over bid; 0 when there is no bid
    pub fn ask_bid_ratio(&self) -> f64 {
        if self.bid == 0.0 {
            0.0
        } else {
            self.ask / self.bid
        }
    }

    pub fn day_diff(&self, now: DateTime<Utc>) -> i64 {
        day_diff(now, self.expiration)
    }
}

/// All contracts sharing one expiration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationGroup {
    pub expiration: DateTime<Utc>,
    /// Calls by ascending strike
    pub calls: Vec<OptionContractSnapshot>,
    /// Puts by ascending strike
    pub puts: Vec<OptionContractSnapshot>,
}

impl ExpirationGroup {
    pub fn new(expiration: DateTime<Utc>) -> Self {
        Self {
            expiration,
            calls: Vec::new(),
            puts: Vec::new(),
        }
    }

    /// Contracts of one type, ascending strike
    pub fn side(&self, option_type: OptionType) -> &[OptionContractSnapshot] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }

    pub fn day_diff(&self, now: DateTime<Utc>) -> i64 {
        day_diff(now, self.expiration)
    }

    fn insert(&mut self, contract: OptionContractSnapshot) {
        let side = match contract.option_type {
            OptionType::Call => &mut self.calls,
            OptionType::Put => &mut self.puts,
        };
        side.push(contract);
        side.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    }
}

/// Option chain snapshot for one underlying, nested expiration-then-strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub underlying: String,
    /// Underlying price at snapshot time
    pub underlying_price: f64,
    /// Groups by ascending expiration
    pub expirations: Vec<ExpirationGroup>,
}

impl OptionChain {
    pub fn new(underlying: impl Into<String>, underlying_price: f64) -> Self {
        Self {
            underlying: underlying.into(),
            underlying_price,
            expirations: Vec::new(),
        }
    }

    /// Add a contract to its expiration group, creating the group if needed
    pub fn add_contract(&mut self, contract: OptionContractSnapshot) {
        match self
            .expirations
            .iter_mut()
            .find(|g| g.expiration == contract.expiration)
        {
            Some(group) => group.insert(contract),
            None => {
                let mut group = ExpirationGroup::new(contract.expiration);
                group.insert(contract);
                self.expirations.push(group);
                self.expirations.sort_by_key(|g| g.expiration);
            }
        }
    }

    /// Every contract, calls before puts within each expiration
    pub fn contracts(&self) -> impl Iterator<Item = &OptionContractSnapshot> {
        self.expirations
            .iter()
            .flat_map(|g| g.calls.iter().chain(g.puts.iter()))
    }

    pub fn len(&self) -> usize {
        self.expirations
            .iter()
            .map(|g| g.calls.len() + g.puts.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
