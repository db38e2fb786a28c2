//! Spreadflip Strategy State
//!
//! Local order book replica maintained from the market data feed:
//! - Price-indexed priority queues per side (O(1) point updates, O(log n) inserts)
//! - Lazy removal of zero-size levels
//! - Crossed-book and price-range validation on every update
//!
//! ## Usage
//!
//! ```rust
//! use spreadflip_core::{BookEntry, Money};
//! use spreadflip_strategy::OrderBook;
//!
//! let mut book = OrderBook::default();
//! book.update(BookEntry::bid(Money::new(5, 0), 1.0)).unwrap();
//! book.update(BookEntry::ask(Money::new(5, 20), 1.0)).unwrap();
//! assert_eq!(book.spread(), Ok(Money::new(0, 20)));
//! ```

pub mod error;
pub mod orderbook;

// Re-export main types
pub use error::{BookError, BookResult};
pub use orderbook::{BookConfig, OrderBook};
