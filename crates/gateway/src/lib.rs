//! Spreadflip Gateway
//!
//! Gateway layer for the spreadflip trading system. Provides:
//! - Domain feed events (snapshot, delta, ticker, fill/cancel acknowledgements)
//! - Coinbase-style WebSocket feed decoding and transport
//! - A paper exchange implementing the `Exchange` port
//!
//! ## Architecture
//!
//! ```text
//! Venue WebSocket
//!         │ JSON frames
//!    ┌────▼────┐
//!    │ Gateway │  decode_message()
//!    │   In    │
//!    └────┬────┘
//!         │ mpsc<FeedEvent>, arrival order
//!    ┌────▼────┐
//!    │ Router  │
//!    └─────────┘
//! ```

pub mod adapters;
pub mod error;
pub mod messages;

// Re-export commonly used types
pub use adapters::{FeedClient, FeedConnection, PaperExchange, decode_message};
pub use error::{DecodeError, GatewayError};
pub use messages::{BookDelta, BookSnapshot, FeedEvent, Ticker};
