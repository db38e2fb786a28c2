//! Runner errors

use spreadflip_strategy::BookError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error("Book update rejected: {0}")]
    Book(#[from] BookError),

    /// Ticker sequence did not strictly increase
    #[error("Out of order ticker: sequence {received} after {last}")]
    OutOfOrderSequence { last: u64, received: u64 },

    #[error("Position error: {0}")]
    Position(#[from] spreadflip_order_manager::Error),

    /// Venue-reported error or undecodable frame
    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Unrecognized feed event: {0}")]
    Unrecognized(String),
}

impl RouterError {
    /// Contract breaches after which the stream's picture of the market
    /// or of our orders cannot be trusted
    pub fn is_integrity_violation(&self) -> bool {
        match self {
            RouterError::Book(BookError::CrossedBook { .. }) => true,
            RouterError::Book(_) => false,
            RouterError::OutOfOrderSequence { .. } => true,
            RouterError::Position(spreadflip_order_manager::Error::UnknownPosition(_)) => true,
            RouterError::Position(_) => false,
            RouterError::Feed(_) | RouterError::Unrecognized(_) => false,
        }
    }
}

/// Failures loading or validating the runner configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<spreadflip_order_manager::Error> for ConfigError {
    fn from(e: spreadflip_order_manager::Error) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
