//! Flip task
//!
//! One spawned task per open position. The task waits for exactly one
//! signal and performs the matching exchange call:
//!
//! ```text
//!                  ┌──────────── FlipTask ─────────────┐
//! FlipHandle ─────►│ oneshot<FlipSignal>               │
//!   sell()         │   Sell   ──► exchange.sell(sell_at)│──► FlipReport
//!   cancel()       │   Cancel ──► exchange.cancel(buy)  │      (mpsc)
//!   (drop)         │   closed ──► exit, no call         │
//!                  └───────────────────────────────────┘
//! ```
//!
//! The signal slot is consumed by the first `sell()` or `cancel()`, so a
//! second signal is a no-op and the exchange sees at most one call.

use log::{debug, error, info, warn};
use spreadflip_core::{Money, OrderId, ProductId, Size};
use spreadflip_ports::{Exchange, ExchangeError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipSignal {
    Sell,
    Cancel,
}

/// Outcome of a flip task, delivered back to the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum FlipReport {
    SellPlaced {
        order_id: OrderId,
        sell_order_id: OrderId,
    },
    SellFailed {
        order_id: OrderId,
        error: ExchangeError,
    },
    CancelSent {
        order_id: OrderId,
    },
    CancelFailed {
        order_id: OrderId,
        error: ExchangeError,
    },
}

impl FlipReport {
    /// Buy order id of the position this report belongs to
    pub fn order_id(&self) -> &OrderId {
        match self {
            FlipReport::SellPlaced { order_id, .. }
            | FlipReport::SellFailed { order_id, .. }
            | FlipReport::CancelSent { order_id }
            | FlipReport::CancelFailed { order_id, .. } => order_id,
        }
    }
}

/// What the task needs to know about its position, captured at spawn
#[derive(Debug, Clone)]
pub struct FlipOrder {
    pub order_id: OrderId,
    pub product: ProductId,
    pub size: Size,
    pub sell_at: Money,
}

pub struct FlipHandle {
    order_id: OrderId,
    signal: Option<oneshot::Sender<FlipSignal>>,
    task: JoinHandle<()>,
}

impl FlipHandle {
    /// Spawn the task for `order` on the current runtime
    pub fn spawn(
        order: FlipOrder,
        exchange: Arc<dyn Exchange>,
        reports: mpsc::UnboundedSender<FlipReport>,
    ) -> Self {
        let (tx, rx) = oneshot::channel();
        let order_id = order.order_id.clone();
        let task = tokio::spawn(run(order, exchange, rx, reports));
        Self {
            order_id,
            signal: Some(tx),
            task,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Ask the task to place the sell leg. Returns false if a signal was
    /// already sent or the task is gone.
    pub fn sell(&mut self) -> bool {
        self.fire(FlipSignal::Sell)
    }

    /// Ask the task to cancel the buy. Returns false if a signal was
    /// already sent or the task is gone.
    pub fn cancel(&mut self) -> bool {
        self.fire(FlipSignal::Cancel)
    }

    pub fn is_signalled(&self) -> bool {
        self.signal.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    fn fire(&mut self, signal: FlipSignal) -> bool {
        match self.signal.take() {
            Some(tx) => tx.send(signal).is_ok(),
            None => {
                debug!("Flip {} already signalled, ignoring {:?}", self.order_id, signal);
                false
            }
        }
    }
}

async fn run(
    order: FlipOrder,
    exchange: Arc<dyn Exchange>,
    signal: oneshot::Receiver<FlipSignal>,
    reports: mpsc::UnboundedSender<FlipReport>,
) {
    let report = match signal.await {
        Ok(FlipSignal::Sell) => {
            match exchange.sell(&order.product, order.sell_at, order.size).await {
                Ok(sell_order_id) => {
                    info!(
                        "Flip {}: sell {} @ {} placed as {}",
                        order.order_id, order.size, order.sell_at, sell_order_id
                    );
                    FlipReport::SellPlaced {
                        order_id: order.order_id,
                        sell_order_id,
                    }
                }
                Err(e) => {
                    error!("Flip {}: sell @ {} failed: {}", order.order_id, order.sell_at, e);
                    FlipReport::SellFailed {
                        order_id: order.order_id,
                        error: e,
                    }
                }
            }
        }
        Ok(FlipSignal::Cancel) => match exchange.cancel(&order.order_id).await {
            Ok(()) => {
                info!("Flip {}: cancel sent", order.order_id);
                FlipReport::CancelSent {
                    order_id: order.order_id,
                }
            }
            Err(e) => {
                warn!("Flip {}: cancel failed: {}", order.order_id, e);
                FlipReport::CancelFailed {
                    order_id: order.order_id,
                    error: e,
                }
            }
        },
        Err(_) => {
            debug!("Flip {}: handle dropped before any signal", order.order_id);
            return;
        }
    };

    if reports.send(report).is_err() {
        debug!("Coordinator gone, dropping flip report");
    }
}
