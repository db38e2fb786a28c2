//! Spreadflip Runner - live spread flipping on one product
//!
//! Wires the feed, the local book, and the flip coordinator together:
//!
//! - **Router**: applies feed events to the book and the coordinator
//! - **Agent**: drives the router from one feed connection, with reports
//! - **Bootstrap**: configuration loading and logging setup
//!
//! ## Architecture
//!
//! ```text
//!               ┌─────────────────┐
//!               │   FeedClient    │  WebSocket, decoded FeedEvents
//!               └────────┬────────┘
//!                        │ mpsc (arrival order)
//!                        ▼         ▲ cancel acks (injector)
//! ┌──────────────────────────────────────────────────────────┐
//! │ FlipAgent                                                │
//! │   ┌────────────────────────────────────────────────────┐ │
//! │   │ MarketEventRouter                                  │ │
//! │   │   OrderBook  ◄── Snapshot / Delta                  │ │
//! │   │   FlipCoordinator ◄── Ticker / Fill / Cancel       │ │
//! │   └──────────────────────────┬─────────────────────────┘ │
//! └──────────────────────────────┼───────────────────────────┘
//!                                │ buy / sell / cancel
//!                                ▼
//!                    ┌───────────────────────┐
//!                    │  Exchange (paper)     │
//!                    └───────────────────────┘
//! ```

pub mod agent;
pub mod bootstrap;
pub mod error;
pub mod router;

// Re-export main types
pub use agent::FlipAgent;
pub use bootstrap::{FeedConfig, RunnerConfig, init_logging, load_from_env};
pub use error::{ConfigError, Result, RouterError};
pub use router::MarketEventRouter;
