//! Error types for tickback-netcode

use thiserror::Error;

/// Netcode error type
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The history window cannot cover a full round trip plus display delay
    #[error("History capacity {capacity} is too short, at least {required} ticks are needed")]
    HistoryTooShort { capacity: usize, required: i64 },

    /// Configuration text could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for netcode operations
pub type Result<T> = std::result::Result<T, Error>;
