//! Spreadflip Core Domain
//!
//! Pure domain types shared by every spreadflip crate.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{BookEntry, OrderId, ProductId, Side};
pub use values::{MONEY_SCALE, Money, MoneyError, Size};
