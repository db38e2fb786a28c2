//! Decoded domain events delivered by the feed

use serde::{Deserialize, Serialize};
use spreadflip_core::{OrderId, ProductId, Side};

use super::market_data::{BookDelta, BookSnapshot, Ticker};

/// One decoded event from the ordered feed sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent {
    Snapshot(BookSnapshot),
    Delta(BookDelta),
    Ticker(Ticker),
    /// An order was completely filled. `product_id` is `None` when the
    /// source does not say (e.g. acks injected by an exchange adapter).
    Fill {
        order_id: OrderId,
        side: Side,
        product_id: Option<ProductId>,
    },
    /// An order was cancelled
    Cancel {
        order_id: OrderId,
        product_id: Option<ProductId>,
    },
    Heartbeat { sequence: u64 },
    /// Subscription confirmed
    Subscribed,
    /// Venue-reported error, or a frame the decoder could not read
    Error { message: String },
    /// Well-formed message of a type we do not handle
    Unrecognized { kind: String },
}

impl FeedEvent {
    /// Product the event describes, when known
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            FeedEvent::Snapshot(s) => Some(&s.product_id),
            FeedEvent::Delta(d) => Some(&d.product_id),
            FeedEvent::Ticker(t) => Some(&t.product_id),
            FeedEvent::Fill { product_id, .. } | FeedEvent::Cancel { product_id, .. } => {
                product_id.as_ref()
            }
            _ => None,
        }
    }

    /// Tag a fill or cancel with its product; other events are unchanged
    pub fn with_product(mut self, product: impl Into<ProductId>) -> Self {
        if let FeedEvent::Fill { product_id, .. } | FeedEvent::Cancel { product_id, .. } =
            &mut self
        {
            *product_id = Some(product.into());
        }
        self
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Snapshot(_) => "snapshot",
            FeedEvent::Delta(_) => "delta",
            FeedEvent::Ticker(_) => "ticker",
            FeedEvent::Fill { .. } => "fill",
            FeedEvent::Cancel { .. } => "cancel",
            FeedEvent::Heartbeat { .. } => "heartbeat",
            FeedEvent::Subscribed => "subscribed",
            FeedEvent::Error { .. } => "error",
            FeedEvent::Unrecognized { .. } => "unrecognized",
        }
    }

    pub fn fill(order_id: impl Into<OrderId>, side: Side) -> Self {
        FeedEvent::Fill {
            order_id: order_id.into(),
            side,
            product_id: None,
        }
    }

    pub fn cancel(order_id: impl Into<OrderId>) -> Self {
        FeedEvent::Cancel {
            order_id: order_id.into(),
            product_id: None,
        }
    }
}
