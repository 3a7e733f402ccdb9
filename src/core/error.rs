//! Error types for option analytics

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Insufficient history: need at least {required} bars, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type StatsResult<T> = Result<T, StatsError>;

impl StatsError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
