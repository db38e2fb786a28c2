use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use spreadflip_core::ProductId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::parser::decode_message;
use super::wire::SubscribeRequest;
use crate::error::GatewayError;
use crate::messages::FeedEvent;

/// WebSocket client for the market data feed
pub struct FeedClient {
    url: String,
    product: ProductId,
    channels: Vec<String>,
    capacity: usize,
}

/// A live feed subscription.
///
/// `events` yields decoded events in arrival order and closes when the
/// transport fails or the venue closes the socket. `injector` lets other
/// collaborators (e.g. the paper exchange) push acknowledgements into the
/// same ordered stream without keeping it open after the reader is gone.
pub struct FeedConnection {
    pub events: mpsc::Receiver<FeedEvent>,
    pub injector: mpsc::WeakSender<FeedEvent>,
    pub reader: JoinHandle<()>,
}

impl FeedClient {
    pub fn new(
        url: impl Into<String>,
        product: ProductId,
        channels: Vec<String>,
        capacity: usize,
    ) -> Self {
        Self {
            url: url.into(),
            product,
            channels,
            capacity,
        }
    }

    /// Connect, subscribe, and start the reader task
    pub async fn connect(&self) -> Result<FeedConnection, GatewayError> {
        let (ws_stream, _) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();

        let request = SubscribeRequest::new(&self.product, &self.channels);
        let json = serde_json::to_string(&request)?;
        write.send(Message::Text(json.into())).await?;
        info!(
            "Subscribed to {} on {} (channels: {:?})",
            self.product, self.url, self.channels
        );

        let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(self.capacity);
        let injector = event_tx.downgrade();

        let reader = tokio::spawn(async move {
            // The sink stays alive for the lifetime of the subscription
            let _write = write;

            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let event = decode_message(text.as_str()).unwrap_or_else(|e| {
                            warn!("Failed to decode feed message: {}", e);
                            FeedEvent::Error {
                                message: e.to_string(),
                            }
                        });
                        if event_tx.send(event).await.is_err() {
                            debug!("Feed consumer dropped, stopping reader");
                            break;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        info!("Feed closed by venue: {:?}", frame);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        log::trace!("Received ping: {:?}", data);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Feed transport error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(FeedConnection {
            events: event_rx,
            injector,
            reader,
        })
    }
}
