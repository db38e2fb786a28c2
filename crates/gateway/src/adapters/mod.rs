//! Exchange adapters
//!
//! Adapters normalize external venue data to domain events (feed in)
//! and implement the `Exchange` port (orders out).

pub mod coinbase;
pub mod paper;

pub use coinbase::{FeedClient, FeedConnection, SubscribeRequest, decode_message};
pub use paper::{PaperExchange, PaperOrder, PaperOrderStatus};
