//! Spreadflip Order Manager
//!
//! Turns top-of-book updates into flip positions and walks each one
//! through its lifecycle:
//! - **Admission**: open a position when the spread is wide enough
//! - **Flip tasks**: one task per position performs the sell or the cancel
//! - **Drift**: cancel resting buys the market has moved past
//! - **Lifecycle**: fills and cancel acks retire positions
//!
//! ## Architecture
//!
//! ```text
//! Router ──► on_tick(bid, ask, spread) ──► ┌──────────────────────────────┐
//!                                          │       FlipCoordinator        │
//! Router ──► on_fill / on_cancel ────────► │  positions: buy id -> flip   │
//!                                          │  sell_orders: sell id -> buy │
//!                                          └──────┬───────────────▲───────┘
//!                                                 │ buy           │ FlipReport
//!                                                 ▼               │
//!                                             Exchange ◄──── FlipTask (per position)
//!                                                          sell / cancel
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spreadflip_order_manager::{FlipConfig, FlipCoordinator};
//!
//! let mut coordinator = FlipCoordinator::new(product, FlipConfig::default(), exchange);
//!
//! if let Some(order_id) = coordinator.on_tick(best_bid, best_ask, spread).await {
//!     // buy resting, flip task waiting for its fill
//! }
//! coordinator.on_fill(&order_id, Side::Buy)?;
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod flip;
pub mod position;

// Re-export main types
pub use config::FlipConfig;
pub use coordinator::FlipCoordinator;
pub use error::{Error, Result};
pub use flip::{FlipHandle, FlipOrder, FlipReport, FlipSignal};
pub use position::{Position, PositionState};
