//! Market data message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spreadflip_core::{BookEntry, Money, ProductId};

/// Full book state for a product, sent once per connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub product_id: ProductId,
    pub bids: Vec<BookEntry>,
    pub asks: Vec<BookEntry>,
}

impl BookSnapshot {
    pub fn new(product_id: impl Into<ProductId>, bids: Vec<BookEntry>, asks: Vec<BookEntry>) -> Self {
        Self {
            product_id: product_id.into(),
            bids,
            asks,
        }
    }
}

/// Incremental level changes (size 0 removes a level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDelta {
    pub product_id: ProductId,
    pub changes: Vec<BookEntry>,
    pub time: Option<DateTime<Utc>>,
}

impl BookDelta {
    pub fn new(product_id: impl Into<ProductId>, changes: Vec<BookEntry>) -> Self {
        Self {
            product_id: product_id.into(),
            changes,
            time: None,
        }
    }
}

/// Best bid/ask summary with a feed sequence number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub product_id: ProductId,
    pub sequence: u64,
    pub best_bid: Money,
    pub best_ask: Money,
    /// Last trade price, when the venue reports one
    pub price: Option<Money>,
    pub time: Option<DateTime<Utc>>,
}

impl Ticker {
    pub fn new(
        product_id: impl Into<ProductId>,
        sequence: u64,
        best_bid: Money,
        best_ask: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            sequence,
            best_bid,
            best_ask,
            price: None,
            time: None,
        }
    }

    /// Get spread (ask - bid)
    pub fn spread(&self) -> Money {
        self.best_ask - self.best_bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_spread() {
        let ticker = Ticker::new("BCH-USD", 7, Money::new(5, 0), Money::new(5, 20));
        assert_eq!(ticker.spread(), Money::new(0, 20));
    }

    #[test]
    fn test_delta_defaults_time() {
        let delta = BookDelta::new("BCH-USD", vec![BookEntry::bid(Money::new(5, 0), 0.0)]);
        assert!(delta.time.is_none());
        assert!(delta.changes[0].is_removal());
    }
}
