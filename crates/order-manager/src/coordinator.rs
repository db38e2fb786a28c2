//! Flip coordinator
//!
//! Owns every open position and its flip task. Ticks drive admission and
//! drift cancellation; fills and cancel acks drive the lifecycle.
//!
//! ```text
//!   on_tick ──► cancel drifted PendingBuy ──► admit? ──► exchange.buy
//!                                                           │
//!                                            Position{PendingBuy} + FlipHandle
//!
//!   on_fill(Buy)  ──► PendingSell, handle.sell()
//!   on_fill(Sell) ──► Done, removed
//!   on_cancel     ──► Done, removed
//! ```
//!
//! Flip tasks report back over an unbounded channel which is drained at
//! the start of every entry point. A sell fill can arrive on the feed
//! before the task's report names the sell order; such fills are held
//! until the report lands.

use log::{debug, error, info, warn};
use spreadflip_core::{Money, OrderId, ProductId, Side};
use spreadflip_ports::Exchange;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::FlipConfig;
use crate::error::{Error, Result};
use crate::flip::{FlipHandle, FlipOrder, FlipReport};
use crate::position::{Position, PositionState};

struct OpenFlip {
    position: Position,
    handle: FlipHandle,
}

pub struct FlipCoordinator {
    product: ProductId,
    config: FlipConfig,
    exchange: Arc<dyn Exchange>,
    /// Keyed by buy order id
    flips: HashMap<OrderId, OpenFlip>,
    /// Sell order id -> buy order id
    sell_orders: HashMap<OrderId, OrderId>,
    /// Sell fills seen before the sell order id was reported
    early_sell_fills: HashSet<OrderId>,
    reports_tx: mpsc::UnboundedSender<FlipReport>,
    reports_rx: mpsc::UnboundedReceiver<FlipReport>,
    backoff_until: Option<Instant>,
}

impl FlipCoordinator {
    pub fn new(product: ProductId, config: FlipConfig, exchange: Arc<dyn Exchange>) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self {
            product,
            config,
            exchange,
            flips: HashMap::new(),
            sell_orders: HashMap::new(),
            early_sell_fills: HashSet::new(),
            reports_tx,
            reports_rx,
            backoff_until: None,
        }
    }

    pub fn product(&self) -> &ProductId {
        &self.product
    }

    pub fn config(&self) -> &FlipConfig {
        &self.config
    }

    pub fn open_count(&self) -> usize {
        self.flips.len()
    }

    pub fn position(&self, order_id: &OrderId) -> Option<&Position> {
        self.flips.get(order_id).map(|f| &f.position)
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.flips.values().map(|f| &f.position)
    }

    /// Admission is suppressed after a rejected buy
    pub fn is_backing_off(&self) -> bool {
        self.backoff_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// React to a new top of book.
    ///
    /// Signals a cancel for every PendingBuy whose prices the market has
    /// moved past, then opens at most one new position. Returns the buy
    /// order id of the opened position, if any.
    pub async fn on_tick(
        &mut self,
        best_bid: Money,
        best_ask: Money,
        spread: Money,
    ) -> Option<OrderId> {
        self.poll_reports();
        self.cancel_drifted(best_bid, best_ask);
        self.try_open(best_bid, best_ask, spread).await
    }

    /// Route a fill for one of our orders
    pub fn on_fill(&mut self, order_id: &OrderId, side: Side) -> Result<()> {
        self.poll_reports();
        match side {
            Side::Buy => self.on_buy_fill(order_id),
            Side::Sell => {
                self.on_sell_fill(order_id);
                Ok(())
            }
        }
    }

    /// Route a cancel acknowledgement. Unknown orders are ignored.
    pub fn on_cancel(&mut self, order_id: &OrderId) {
        self.poll_reports();
        let key = self
            .sell_orders
            .get(order_id)
            .cloned()
            .unwrap_or_else(|| order_id.clone());

        match self.retire(&key) {
            Some(position) if position.sell_order_id.as_ref() == Some(order_id) => {
                warn!(
                    "Sell {} for position {} cancelled by venue; {} left unhedged",
                    order_id, key, position.size
                );
            }
            Some(_) => info!("Position {} cancelled", key),
            None => warn!("Cancel ack for unknown order {}", order_id),
        }
    }

    /// Apply outstanding flip task reports. Returns how many were applied.
    pub fn poll_reports(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(report) = self.reports_rx.try_recv() {
            applied += 1;
            match report {
                FlipReport::SellPlaced {
                    order_id,
                    sell_order_id,
                } => {
                    let filled = self.early_sell_fills.remove(&sell_order_id);
                    match self.flips.get_mut(&order_id) {
                        Some(flip) => {
                            flip.position.sell_order_id = Some(sell_order_id.clone());
                            self.sell_orders.insert(sell_order_id, order_id.clone());
                            if filled {
                                self.complete(&order_id);
                            }
                        }
                        None => debug!(
                            "Sell {} placed for retired position {}",
                            sell_order_id, order_id
                        ),
                    }
                }
                FlipReport::SellFailed { order_id, error } => {
                    if self.retire(&order_id).is_some() {
                        error!(
                            "Position {} retired with its sell leg unplaced: {}",
                            order_id, error
                        );
                    }
                }
                FlipReport::CancelSent { order_id } => {
                    debug!("Cancel for {} accepted, awaiting ack", order_id);
                }
                FlipReport::CancelFailed { order_id, error } => {
                    warn!(
                        "Cancel for {} failed: {}; waiting for a fill or cancel ack",
                        order_id, error
                    );
                }
            }
        }

        if !self.early_sell_fills.is_empty() && !self.awaiting_sell_id() {
            debug!(
                "Dropping {} sell fills that matched no position",
                self.early_sell_fills.len()
            );
            self.early_sell_fills.clear();
        }
        applied
    }

    /// Some position has signalled its sell but not yet learned the id
    fn awaiting_sell_id(&self) -> bool {
        self.flips.values().any(|f| {
            f.position.state == PositionState::PendingSell && f.position.sell_order_id.is_none()
        })
    }

    fn cancel_drifted(&mut self, best_bid: Money, best_ask: Money) {
        for (order_id, flip) in self.flips.iter_mut() {
            if flip.position.state != PositionState::PendingBuy
                || !flip.position.has_drifted(best_bid, best_ask)
            {
                continue;
            }

            info!(
                "Cancelling {}: market {}/{} moved past {}/{}",
                order_id, best_bid, best_ask, flip.position.buy_at, flip.position.sell_at
            );
            match flip.position.transition(PositionState::Cancelling) {
                Ok(()) => {
                    if !flip.handle.cancel() {
                        warn!("Flip task for {} already gone", order_id);
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
    }

    async fn try_open(&mut self, best_bid: Money, best_ask: Money, spread: Money) -> Option<OrderId> {
        if spread <= self.config.min_profitable_spread {
            return None;
        }
        if self.flips.len() >= self.config.max_concurrent_positions {
            debug!(
                "Spread {} is profitable but {} positions are open",
                spread,
                self.flips.len()
            );
            return None;
        }
        if self.is_backing_off() {
            debug!("Spread {} is profitable but admission is backing off", spread);
            return None;
        }

        let buy_at = best_bid + self.config.tick_margin;
        let sell_at = best_ask - self.config.tick_margin;
        if buy_at >= sell_at {
            debug!("Margins leave no room: buy {} >= sell {}", buy_at, sell_at);
            return None;
        }

        let size = self.config.order_size;
        info!(
            "Spread {} > {}: buying {} {} @ {} to sell @ {}",
            spread, self.config.min_profitable_spread, size, self.product, buy_at, sell_at
        );

        let order_id = match self.exchange.buy(&self.product, buy_at, size).await {
            Ok(order_id) => order_id,
            Err(e) => {
                let backoff = self.config.admission_backoff();
                warn!("Buy @ {} failed: {}; pausing admission for {:?}", buy_at, e, backoff);
                self.backoff_until = Some(Instant::now() + backoff);
                return None;
            }
        };
        self.backoff_until = None;

        if self.flips.contains_key(&order_id) {
            error!("Exchange returned duplicate order id {}", order_id);
            return None;
        }

        let position = Position::new(order_id.clone(), self.product.clone(), size, buy_at, sell_at);
        let handle = FlipHandle::spawn(
            FlipOrder {
                order_id: order_id.clone(),
                product: self.product.clone(),
                size,
                sell_at,
            },
            self.exchange.clone(),
            self.reports_tx.clone(),
        );
        self.flips.insert(order_id.clone(), OpenFlip { position, handle });
        Some(order_id)
    }

    fn on_buy_fill(&mut self, order_id: &OrderId) -> Result<()> {
        let flip = self
            .flips
            .get_mut(order_id)
            .ok_or_else(|| Error::UnknownPosition(order_id.clone()))?;

        let state = flip.position.state;
        match state {
            PositionState::PendingBuy => {
                flip.position.transition(PositionState::PendingSell)?;
                if !flip.handle.sell() {
                    error!("Flip task for {} gone before its sell", order_id);
                }
                info!(
                    "Buy {} filled @ {}, selling @ {}",
                    order_id, flip.position.buy_at, flip.position.sell_at
                );
                Ok(())
            }
            PositionState::Cancelling => {
                warn!(
                    "Buy {} filled after its cancel was signalled; retiring without a sell",
                    order_id
                );
                self.retire(order_id);
                Ok(())
            }
            from => Err(Error::InvalidTransition {
                order_id: order_id.clone(),
                from,
                to: PositionState::PendingSell,
            }),
        }
    }

    fn on_sell_fill(&mut self, order_id: &OrderId) {
        let key = match self.sell_orders.get(order_id) {
            Some(buy_id) => buy_id.clone(),
            None if self
                .position(order_id)
                .is_some_and(|p| p.state == PositionState::PendingSell) =>
            {
                order_id.clone()
            }
            None if self.awaiting_sell_id() => {
                debug!("Sell fill for {} ahead of its placement report, holding", order_id);
                self.early_sell_fills.insert(order_id.clone());
                return;
            }
            None => {
                warn!("Sell fill for untracked order {}", order_id);
                return;
            }
        };
        self.complete(&key);
    }

    fn complete(&mut self, key: &OrderId) {
        if let Some(position) = self.retire(key) {
            info!(
                "Flip {} complete: bought @ {}, sold @ {}, margin {}",
                key,
                position.buy_at,
                position.sell_at,
                position.margin()
            );
        }
    }

    /// Remove a position and mark it Done
    fn retire(&mut self, order_id: &OrderId) -> Option<Position> {
        let OpenFlip { mut position, .. } = self.flips.remove(order_id)?;
        if let Some(sell_id) = &position.sell_order_id {
            self.sell_orders.remove(sell_id);
        }
        if let Err(e) = position.transition(PositionState::Done) {
            warn!("{}", e);
        }
        Some(position)
    }
}
