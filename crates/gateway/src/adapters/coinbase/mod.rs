//! Coinbase-style WebSocket feed adapter
//!
//! Decodes `snapshot`, `l2update`, `ticker`, `done`, `heartbeat`,
//! `subscriptions` and `error` frames into [`crate::FeedEvent`]s.

mod client;
mod parser;
mod wire;

pub use client::{FeedClient, FeedConnection};
pub use parser::decode_message;
pub use wire::SubscribeRequest;
