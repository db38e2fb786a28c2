//! Flip agent - drives a router from one feed connection
//!
//! Handles:
//! - Receiving feed events in arrival order
//! - Stopping the stream on integrity violations
//! - Periodic book and position reports

use log::{error, info, warn};
use spreadflip_gateway::FeedEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::router::MarketEventRouter;

pub struct FlipAgent {
    router: MarketEventRouter,
    report_interval: Duration,
}

impl FlipAgent {
    pub fn new(router: MarketEventRouter, report_interval: Duration) -> Self {
        Self {
            router,
            report_interval,
        }
    }

    pub fn router(&self) -> &MarketEventRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut MarketEventRouter {
        &mut self.router
    }

    pub fn into_router(self) -> MarketEventRouter {
        self.router
    }

    /// Consume `events` until the feed closes or an integrity violation
    /// makes the stream untrustworthy.
    ///
    /// Other router errors are logged and the stream continues.
    pub async fn run(&mut self, mut events: mpsc::Receiver<FeedEvent>) -> Result<()> {
        let product = self.router.product().clone();
        info!("[{}] Agent started", product);

        let mut report = tokio::time::interval(self.report_interval);
        report.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        report.tick().await;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("[{}] Feed closed", product);
                        return Ok(());
                    };
                    let kind = event.kind();
                    if let Err(e) = self.router.process(event).await {
                        if e.is_integrity_violation() {
                            error!("[{}] Stopping stream on {}: {}", product, kind, e);
                            return Err(e);
                        }
                        warn!("[{}] Skipped {}: {}", product, kind, e);
                    }
                }

                _ = report.tick() => self.report(),
            }
        }
    }

    /// Log top of book and open positions
    pub fn report(&mut self) {
        let product = self.router.product().clone();
        self.router.coordinator_mut().poll_reports();

        let book = self.router.book_mut();
        let levels = book.size();
        match (book.best_bid(), book.best_ask()) {
            (Some(bid), Some(ask)) => info!(
                "[{}] bid {} x {} | ask {} x {} | spread {} | {} levels",
                product,
                bid.price,
                bid.size,
                ask.price,
                ask.size,
                ask.price - bid.price,
                levels
            ),
            _ => info!("[{}] book one-sided or empty ({} levels)", product, levels),
        }

        let coordinator = self.router.coordinator();
        info!(
            "[{}] {} open positions{}",
            product,
            coordinator.open_count(),
            if coordinator.is_backing_off() {
                ", admission backing off"
            } else {
                ""
            }
        );
        for position in coordinator.open_positions() {
            info!(
                "[{}]   {} {:?} buy {} sell {}",
                product, position.order_id, position.state, position.buy_at, position.sell_at
            );
        }
    }
}
