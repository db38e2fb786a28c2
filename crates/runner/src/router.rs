//! Market event router
//!
//! Single consumer of the ordered feed. Applies book events to the local
//! book and forwards tickers, fills, and cancel acks to the coordinator,
//! one event at a time in arrival order.
//!
//! ```text
//! FeedEvent ──► Snapshot ──► clear + apply levels (asks, bids)
//!           ──► Delta    ──► apply levels
//!           ──► Ticker   ──► sequence + price check ──► FlipCoordinator::on_tick
//!           ──► Fill     ──► FlipCoordinator::on_fill
//!           ──► Cancel   ──► FlipCoordinator::on_cancel
//!           ──► Error / Unrecognized ──► RouterError
//! ```
//!
//! A batch of levels is applied removals first, and one rejected level
//! does not stop the rest of the batch.

use log::{debug, info, trace, warn};
use spreadflip_core::{BookEntry, ProductId};
use spreadflip_gateway::{FeedEvent, Ticker};
use spreadflip_order_manager::FlipCoordinator;
use spreadflip_strategy::{BookError, OrderBook};

use crate::error::{Result, RouterError};

pub struct MarketEventRouter {
    product: ProductId,
    book: OrderBook,
    coordinator: FlipCoordinator,
    /// Last accepted ticker sequence on the current stream
    last_sequence: Option<u64>,
}

impl MarketEventRouter {
    pub fn new(book: OrderBook, coordinator: FlipCoordinator) -> Self {
        Self {
            product: coordinator.product().clone(),
            book,
            coordinator,
            last_sequence: None,
        }
    }

    pub fn product(&self) -> &ProductId {
        &self.product
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Peeking the book discards stale levels, hence `&mut`
    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    pub fn coordinator(&self) -> &FlipCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut FlipCoordinator {
        &mut self.coordinator
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Forget stream state before a reconnect. Open positions are kept.
    pub fn resync(&mut self) {
        info!("[{}] Resync: clearing book and ticker sequence", self.product);
        self.book.clear();
        self.last_sequence = None;
    }

    /// Apply one feed event
    pub async fn process(&mut self, event: FeedEvent) -> Result<()> {
        if let Some(product) = event.product_id() {
            if *product != self.product {
                debug!("Ignoring {} for {}", event.kind(), product);
                return Ok(());
            }
        }

        match event {
            FeedEvent::Snapshot(snapshot) => {
                self.book.clear();
                let levels = snapshot.asks.len() + snapshot.bids.len();
                let applied = self.apply_levels(snapshot.asks.into_iter().chain(snapshot.bids));
                info!("[{}] Snapshot applied: {} levels", self.product, levels);
                applied?;
            }
            FeedEvent::Delta(delta) => self.apply_levels(delta.changes)?,
            FeedEvent::Ticker(ticker) => self.on_ticker(ticker).await?,
            FeedEvent::Fill { order_id, side, .. } => {
                debug!("[{}] Fill {} {}", self.product, side, order_id);
                self.coordinator.on_fill(&order_id, side)?;
            }
            FeedEvent::Cancel { order_id, .. } => self.coordinator.on_cancel(&order_id),
            FeedEvent::Heartbeat { sequence } => trace!("Heartbeat {}", sequence),
            FeedEvent::Subscribed => info!("[{}] Subscription confirmed", self.product),
            FeedEvent::Error { message } => return Err(RouterError::Feed(message)),
            FeedEvent::Unrecognized { kind } => return Err(RouterError::Unrecognized(kind)),
        }
        Ok(())
    }

    /// Returns the first crossed level if any, else the first rejection.
    fn apply_levels(&mut self, entries: impl IntoIterator<Item = BookEntry>) -> Result<()> {
        let (removals, upserts): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(BookEntry::is_removal);

        let mut rejected: Option<BookError> = None;
        for entry in removals.into_iter().chain(upserts) {
            let Err(e) = self.book.update(entry) else {
                continue;
            };
            warn!(
                "[{}] Rejected {} level {} x {}: {}",
                self.product, entry.side, entry.price, entry.size, e
            );
            let crossed = matches!(e, BookError::CrossedBook { .. });
            match rejected {
                None => rejected = Some(e),
                Some(BookError::CrossedBook { .. }) => {}
                Some(_) if crossed => rejected = Some(e),
                Some(_) => {}
            }
        }

        match rejected {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    async fn on_ticker(&mut self, ticker: Ticker) -> Result<()> {
        if let Some(last) = self.last_sequence {
            if ticker.sequence <= last {
                return Err(RouterError::OutOfOrderSequence {
                    last,
                    received: ticker.sequence,
                });
            }
        }
        self.last_sequence = Some(ticker.sequence);

        let max = self.book.config().max_price;
        for price in [ticker.best_bid, ticker.best_ask] {
            if !price.is_positive() || price > max {
                return Err(BookError::PriceOutOfRange { price, max }.into());
            }
        }

        self.coordinator
            .on_tick(ticker.best_bid, ticker.best_ask, ticker.spread())
            .await;
        Ok(())
    }
}
