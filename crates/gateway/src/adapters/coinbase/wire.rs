//! Raw Coinbase payload shapes. Prices and sizes arrive as strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spreadflip_core::ProductId;

#[derive(Debug, Deserialize)]
pub(super) struct SnapshotWire {
    pub product_id: String,
    pub bids: Vec<Vec<String>>,
    pub asks: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct L2UpdateWire {
    pub product_id: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    pub changes: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TickerWire {
    pub product_id: String,
    pub sequence: u64,
    pub best_bid: String,
    pub best_ask: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DoneWire {
    pub order_id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    pub reason: String,
    pub side: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct HeartbeatWire {
    pub sequence: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorWire {
    pub message: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Subscribe request sent right after the socket opens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    kind: &'static str,
    product_ids: Vec<ProductId>,
    channels: Vec<String>,
}

impl SubscribeRequest {
    pub fn new(product: &ProductId, channels: &[String]) -> Self {
        Self {
            kind: "subscribe",
            product_ids: vec![product.clone()],
            channels: channels.to_vec(),
        }
    }
}
