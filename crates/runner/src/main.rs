use anyhow::Context;
use log::{error, info, warn};
use spreadflip_gateway::{FeedClient, PaperExchange};
use spreadflip_order_manager::FlipCoordinator;
use spreadflip_runner::{FlipAgent, MarketEventRouter, init_logging, load_from_env};
use spreadflip_strategy::OrderBook;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = load_from_env().context("loading configuration")?;
    info!(
        "Flipping {} on {} (min spread {}, margin {}, size {})",
        config.feed.product,
        config.feed.url,
        config.flip.min_profitable_spread,
        config.flip.tick_margin,
        config.flip.order_size
    );

    let exchange = Arc::new(PaperExchange::new());
    let coordinator =
        FlipCoordinator::new(config.feed.product.clone(), config.flip.clone(), exchange.clone());
    let router = MarketEventRouter::new(OrderBook::new(config.book.clone()), coordinator);
    let mut agent = FlipAgent::new(router, config.report_interval());

    let client = FeedClient::new(
        config.feed.url.clone(),
        config.feed.product.clone(),
        config.feed.channels.clone(),
        config.feed.channel_capacity,
    );

    loop {
        match client.connect().await {
            Ok(connection) => {
                exchange.attach(connection.injector.clone());
                let stopped = tokio::select! {
                    result = agent.run(connection.events) => Some(result),
                    _ = tokio::signal::ctrl_c() => None,
                };
                connection.reader.abort();

                match stopped {
                    Some(Ok(())) => warn!("Feed ended"),
                    Some(Err(e)) => error!("Stream stopped: {}", e),
                    None => {
                        info!(
                            "Shutting down with {} open positions",
                            agent.router().coordinator().open_count()
                        );
                        agent.report();
                        return Ok(());
                    }
                }
            }
            Err(e) => error!("Feed connection failed: {}", e),
        }

        agent.router_mut().resync();
        let delay = config.feed.reconnect_delay();
        info!("Reconnecting in {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
