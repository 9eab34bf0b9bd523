//! Error types for tickback-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid delta time: {0}")]
    InvalidDeltaTime(f64),

    #[error("Unknown tick callback: {0}")]
    UnknownCallback(u64),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
