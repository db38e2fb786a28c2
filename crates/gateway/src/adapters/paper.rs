//! In-memory paper exchange
//!
//! Accepts every order (unless told to reject buys), assigns UUID order
//! ids, and records each call so dry runs and tests can inspect them.

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use spreadflip_core::{Money, OrderId, ProductId, Side, Size};
use spreadflip_ports::{Exchange, ExchangeError, ExchangeResult};
use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::messages::FeedEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperOrderStatus {
    Open,
    Cancelled,
}

/// An order accepted by the paper exchange
#[derive(Debug, Clone, PartialEq)]
pub struct PaperOrder {
    pub id: OrderId,
    pub product: ProductId,
    pub side: Side,
    pub price: Money,
    pub size: Size,
    pub status: PaperOrderStatus,
}

#[derive(Debug, Default)]
struct PaperState {
    /// Accepted orders in placement order
    orders: Vec<PaperOrder>,
    index: HashMap<OrderId, usize>,
    /// Every successful cancel call, in call order
    cancels: Vec<OrderId>,
    reject_buys: usize,
}

#[derive(Default)]
pub struct PaperExchange {
    state: Mutex<PaperState>,
    acks: Mutex<Option<mpsc::WeakSender<FeedEvent>>>,
}

impl PaperExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish cancel acknowledgements into a feed stream
    pub fn attach(&self, injector: mpsc::WeakSender<FeedEvent>) {
        *self.acks.lock() = Some(injector);
    }

    /// Reject the next `n` buy calls
    pub fn reject_next_buys(&self, n: usize) {
        self.state.lock().reject_buys = n;
    }

    pub fn orders(&self) -> Vec<PaperOrder> {
        self.state.lock().orders.clone()
    }

    pub fn buys(&self) -> Vec<PaperOrder> {
        self.orders_on(Side::Buy)
    }

    pub fn sells(&self) -> Vec<PaperOrder> {
        self.orders_on(Side::Sell)
    }

    pub fn cancels(&self) -> Vec<OrderId> {
        self.state.lock().cancels.clone()
    }

    pub fn order(&self, id: &OrderId) -> Option<PaperOrder> {
        let state = self.state.lock();
        state.index.get(id).map(|&i| state.orders[i].clone())
    }

    fn orders_on(&self, side: Side) -> Vec<PaperOrder> {
        self.state
            .lock()
            .orders
            .iter()
            .filter(|o| o.side == side)
            .cloned()
            .collect()
    }

    fn place(&self, product: &ProductId, side: Side, price: Money, size: Size) -> ExchangeResult<OrderId> {
        if !price.is_positive() {
            return Err(ExchangeError::Rejected(format!("invalid price {}", price)));
        }
        if !(size.is_finite() && size > 0.0) {
            return Err(ExchangeError::Rejected(format!("invalid size {}", size)));
        }

        let mut state = self.state.lock();
        if side == Side::Buy && state.reject_buys > 0 {
            state.reject_buys -= 1;
            return Err(ExchangeError::Rejected("paper exchange rejecting buys".to_string()));
        }

        let id = OrderId::new(Uuid::new_v4().to_string());
        let index = state.orders.len();
        state.orders.push(PaperOrder {
            id: id.clone(),
            product: product.clone(),
            side,
            price,
            size,
            status: PaperOrderStatus::Open,
        });
        state.index.insert(id.clone(), index);

        info!("[paper] {} {} {} @ {} -> {}", side, size, product, price, id);
        Ok(id)
    }
}

#[async_trait]
impl Exchange for PaperExchange {
    async fn buy(&self, product: &ProductId, price: Money, size: Size) -> ExchangeResult<OrderId> {
        self.place(product, Side::Buy, price, size)
    }

    async fn sell(&self, product: &ProductId, price: Money, size: Size) -> ExchangeResult<OrderId> {
        self.place(product, Side::Sell, price, size)
    }

    async fn cancel(&self, order_id: &OrderId) -> ExchangeResult<()> {
        let product = {
            let mut state = self.state.lock();
            let Some(&i) = state.index.get(order_id) else {
                return Err(ExchangeError::UnknownOrder(order_id.clone()));
            };
            if state.orders[i].status == PaperOrderStatus::Cancelled {
                return Err(ExchangeError::Rejected(format!("{} already cancelled", order_id)));
            }
            state.orders[i].status = PaperOrderStatus::Cancelled;
            state.cancels.push(order_id.clone());
            state.orders[i].product.clone()
        };
        info!("[paper] cancel {}", order_id);

        let injector = self.acks.lock().clone();
        if let Some(tx) = injector.and_then(|weak| weak.upgrade()) {
            if tx
                .send(FeedEvent::cancel(order_id.clone()).with_product(product))
                .await.is_err() {
                debug!("[paper] feed gone, dropping cancel ack for {}", order_id);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "paper"
    }
}
