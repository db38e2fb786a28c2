//! Flip positions and their lifecycle
//!
//! ```text
//! PendingBuy ──buy fill──► PendingSell ──sell fill──► Done
//!     │
//!     ├──price drift──► Cancelling ──cancel ack──► Done
//!     │
//!     └──venue cancel──► Done
//! ```
//!
//! A resting sell is never cancelled by the strategy; only the buy leg is.

use serde::{Deserialize, Serialize};
use spreadflip_core::{Money, OrderId, ProductId, Size};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionState {
    /// Buy resting on the venue
    PendingBuy,
    /// Cancel signalled for the buy, awaiting acknowledgement
    Cancelling,
    /// Buy filled, sell placed or being placed
    PendingSell,
    Done,
}

impl PositionState {
    pub fn can_transition_to(self, next: PositionState) -> bool {
        use PositionState::*;
        matches!(
            (self, next),
            (PendingBuy, PendingSell)
                | (PendingBuy, Cancelling)
                | (PendingBuy, Done)
                | (Cancelling, Done)
                | (PendingSell, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == PositionState::Done
    }
}

/// One open flip: a buy at `buy_at` to be flipped into a sell at `sell_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Buy order id; the position's key for its whole life
    pub order_id: OrderId,
    pub product: ProductId,
    pub size: Size,
    pub buy_at: Money,
    pub sell_at: Money,
    pub state: PositionState,
    /// Set once the flip task reports the sell leg was placed
    pub sell_order_id: Option<OrderId>,
}

impl Position {
    pub fn new(
        order_id: OrderId,
        product: ProductId,
        size: Size,
        buy_at: Money,
        sell_at: Money,
    ) -> Self {
        Self {
            order_id,
            product,
            size,
            buy_at,
            sell_at,
            state: PositionState::PendingBuy,
            sell_order_id: None,
        }
    }

    pub fn transition(&mut self, next: PositionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                order_id: self.order_id.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// The market moved past the prices this flip was opened at
    pub fn has_drifted(&self, best_bid: Money, best_ask: Money) -> bool {
        best_bid > self.buy_at || best_ask < self.sell_at
    }

    /// Per-unit margin captured if both legs fill
    pub fn margin(&self) -> Money {
        self.sell_at - self.buy_at
    }
}
