use spreadflip_core::OrderId;
use thiserror::Error;

/// Errors reported by an [`crate::Exchange`] implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),
}

pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
