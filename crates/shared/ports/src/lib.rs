//! Spreadflip Ports
//!
//! Port definitions (traits) for the spreadflip trading system.
//! These define the boundaries between domain logic and infrastructure.

mod error;
mod exchange;

pub use error::{ExchangeError, ExchangeResult};
pub use exchange::Exchange;
