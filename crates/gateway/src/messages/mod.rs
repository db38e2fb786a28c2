//! Domain message types produced by the gateway
//!
//! The feed delivers these already decoded; nothing downstream of the
//! gateway sees venue JSON.

pub mod event;
pub mod market_data;

pub use event::FeedEvent;
pub use market_data::{BookDelta, BookSnapshot, Ticker};
