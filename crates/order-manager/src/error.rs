//! Order Manager errors

use spreadflip_core::OrderId;
use thiserror::Error;

use crate::position::PositionState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The exchange reported a buy fill for an order we never tracked
    #[error("Unknown position for order {0}")]
    UnknownPosition(OrderId),

    #[error("Invalid position transition for {order_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        order_id: OrderId,
        from: PositionState,
        to: PositionState,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
