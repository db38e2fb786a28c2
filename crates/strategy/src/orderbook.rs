//! Local Order Book
//!
//! Each side is a price-keyed priority queue plus a price -> size map, so a
//! point update for an existing level is O(1) and a new level costs O(log n).
//! Zero-size updates only tombstone the level; the heap entry is discarded
//! the next time it surfaces at the top of its side.

use log::debug;
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use spreadflip_core::{BookEntry, Money, Side, Size};
use std::collections::HashMap;

use crate::error::{BookError, BookResult};

/// Order book configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Highest price accepted from the feed
    pub max_price: Money,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            max_price: Money::new(1_000_000, 0),
        }
    }
}

/// Heap priority: best ask is the lowest price, best bid the highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct LevelPriority(i64);

impl LevelPriority {
    fn of(side: Side, price: Money) -> Self {
        match side {
            Side::Buy => LevelPriority(price.minor_units()),
            Side::Sell => LevelPriority(-price.minor_units()),
        }
    }
}

/// One side of the book.
///
/// Invariant: a price is a key of `sizes` iff it is an item of `levels`.
/// A size of 0.0 marks a tombstone awaiting physical removal.
#[derive(Debug, Clone)]
struct Ladder {
    side: Side,
    levels: PriorityQueue<Money, LevelPriority>,
    sizes: HashMap<Money, Size>,
}

impl Ladder {
    fn new(side: Side) -> Self {
        Self {
            side,
            levels: PriorityQueue::new(),
            sizes: HashMap::new(),
        }
    }

    fn apply(&mut self, price: Money, size: Size) {
        if size == 0.0 {
            if let Some(current) = self.sizes.get_mut(&price) {
                *current = 0.0;
            }
            return;
        }

        match self.sizes.get_mut(&price) {
            Some(current) => *current = size,
            None => {
                self.sizes.insert(price, size);
                self.levels.push(price, LevelPriority::of(self.side, price));
            }
        }
    }

    /// Best live level, discarding tombstones found at the top
    fn best(&mut self) -> Option<BookEntry> {
        while let Some((&price, _)) = self.levels.peek() {
            match self.sizes.get(&price) {
                Some(&size) if size > 0.0 => return Some(BookEntry::new(self.side, price, size)),
                _ => {
                    self.levels.pop();
                    self.sizes.remove(&price);
                    debug!("Discarded {} tombstone at {}", self.side, price);
                }
            }
        }
        None
    }

    /// Remove every level, best first, skipping tombstones
    fn drain(&mut self) -> Vec<BookEntry> {
        let mut entries = Vec::with_capacity(self.levels.len());
        while let Some((price, _)) = self.levels.pop() {
            if let Some(size) = self.sizes.remove(&price) {
                if size > 0.0 {
                    entries.push(BookEntry::new(self.side, price, size));
                }
            }
        }
        entries
    }

    fn live_size(&self, price: Money) -> Option<Size> {
        self.sizes.get(&price).copied().filter(|&s| s > 0.0)
    }

    fn len(&self) -> usize {
        self.levels.len()
    }

    fn clear(&mut self) {
        self.levels.clear();
        self.sizes.clear();
    }
}

/// Two-sided aggregate order book for a single product.
///
/// ```text
/// sell 5.30
/// sell 5.22
/// sell 5.20 <- best ask (min)
/// =========
/// buy  5.14 <- best bid (max)
/// buy  5.10
/// ```
#[derive(Debug, Clone)]
pub struct OrderBook {
    config: BookConfig,
    bids: Ladder,
    asks: Ladder,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(BookConfig::default())
    }
}

impl OrderBook {
    pub fn new(config: BookConfig) -> Self {
        Self {
            config,
            bids: Ladder::new(Side::Buy),
            asks: Ladder::new(Side::Sell),
        }
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Upsert the aggregate size at `entry.price` on `entry.side`.
    ///
    /// Size 0 removes the level (no-op when absent). Rejected updates leave
    /// the book unchanged.
    pub fn update(&mut self, entry: BookEntry) -> BookResult<()> {
        if !entry.size.is_finite() || entry.size < 0.0 {
            return Err(BookError::InvalidSize {
                price: entry.price,
                size: entry.size,
            });
        }
        if !entry.price.is_positive() || entry.price > self.config.max_price {
            return Err(BookError::PriceOutOfRange {
                price: entry.price,
                max: self.config.max_price,
            });
        }

        if entry.size > 0.0 {
            self.check_uncrossed(&entry)?;
        }

        self.ladder_mut(entry.side).apply(entry.price, entry.size);
        Ok(())
    }

    fn check_uncrossed(&mut self, entry: &BookEntry) -> BookResult<()> {
        match entry.side {
            Side::Buy => {
                if let Some(ask) = self.asks.best() {
                    if entry.price >= ask.price {
                        return Err(BookError::CrossedBook {
                            bid: entry.price,
                            ask: ask.price,
                        });
                    }
                }
            }
            Side::Sell => {
                if let Some(bid) = self.bids.best() {
                    if entry.price <= bid.price {
                        return Err(BookError::CrossedBook {
                            bid: bid.price,
                            ask: entry.price,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Lowest live ask
    pub fn best_ask(&mut self) -> Option<BookEntry> {
        self.asks.best()
    }

    /// Highest live bid
    pub fn best_bid(&mut self) -> Option<BookEntry> {
        self.bids.best()
    }

    /// Get spread (best ask - best bid)
    pub fn spread(&mut self) -> BookResult<Money> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Ok(ask.price - bid.price),
            _ => Err(BookError::EmptyBook),
        }
    }

    /// Entry count across both sides, tombstones included
    pub fn size(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Drain one side, best level first. The side is empty afterwards.
    pub fn dump(&mut self, side: Side) -> Vec<BookEntry> {
        self.ladder_mut(side).drain()
    }

    /// Live size resting at `price` on `side`
    pub fn size_at(&self, side: Side, price: Money) -> Option<Size> {
        self.ladder(side).live_size(price)
    }

    /// Drop all levels on both sides
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    fn ladder(&self, side: Side) -> &Ladder {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut Ladder {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}
