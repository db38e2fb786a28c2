//! Market-to-exchange flow through the router and agent
//!
//! Feeds decoded events into a router backed by the paper exchange:
//! 1. Snapshot seeds the book
//! 2. A wide ticker opens a flip inside the spread
//! 3. The buy fill places the sell, the sell fill retires the position
//! 4. Drift cancels a resting buy and the ack comes back through the feed

use spreadflip_core::{BookEntry, Money, ProductId, Side};
use spreadflip_gateway::{BookSnapshot, FeedEvent, PaperExchange, Ticker, decode_message};
use spreadflip_order_manager::{FlipConfig, FlipCoordinator, PositionState};
use spreadflip_runner::{FlipAgent, MarketEventRouter};
use spreadflip_strategy::OrderBook;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const PRODUCT: &str = "BCH-USD";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn m(major: i64, minor: i64) -> Money {
    Money::new(major, minor)
}

fn router() -> (MarketEventRouter, Arc<PaperExchange>) {
    let exchange = Arc::new(PaperExchange::new());
    let coordinator =
        FlipCoordinator::new(ProductId::new(PRODUCT), FlipConfig::default(), exchange.clone());
    (MarketEventRouter::new(OrderBook::default(), coordinator), exchange)
}

fn snapshot() -> FeedEvent {
    FeedEvent::Snapshot(BookSnapshot::new(
        PRODUCT,
        vec![BookEntry::bid(m(5, 0), 1.0)],
        vec![BookEntry::ask(m(5, 20), 1.0)],
    ))
}

fn ticker(sequence: u64, bid: Money, ask: Money) -> FeedEvent {
    FeedEvent::Ticker(Ticker::new(PRODUCT, sequence, bid, ask))
}

async fn wait_for(mut done: impl FnMut() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_flip_round_trip() {
    init_logger();
    let (mut router, exchange) = router();

    router.process(snapshot()).await.unwrap();
    assert_eq!(router.book_mut().spread(), Ok(m(0, 20)));

    router.process(ticker(1, m(5, 0), m(5, 20))).await.unwrap();
    let buys = exchange.buys();
    assert_eq!(buys.len(), 1);
    assert_eq!(buys[0].price, m(5, 4));

    let buy_id = buys[0].id.clone();
    let position = router.coordinator().position(&buy_id).unwrap();
    assert_eq!((position.buy_at, position.sell_at), (m(5, 4), m(5, 16)));

    router
        .process(FeedEvent::fill(buy_id.clone(), Side::Buy))
        .await
        .unwrap();
    wait_for(|| exchange.sells().len() == 1).await;
    assert_eq!(exchange.sells()[0].price, m(5, 16));
    assert_eq!(
        router.coordinator().position(&buy_id).unwrap().state,
        PositionState::PendingSell
    );

    let sell_id = exchange.sells()[0].id.clone();
    router
        .process(FeedEvent::fill(sell_id, Side::Sell))
        .await
        .unwrap();
    assert_eq!(router.coordinator().open_count(), 0);
}

#[tokio::test]
async fn test_decoded_frames_drive_the_book() {
    init_logger();
    let (mut router, exchange) = router();

    let frames = [
        r#"{"type":"snapshot","product_id":"BCH-USD","bids":[["5.00","1.5"]],"asks":[["5.20","2.0"]]}"#,
        r#"{"type":"l2update","product_id":"BCH-USD","changes":[["buy","5.01","0.5"]]}"#,
        r#"{"type":"ticker","product_id":"BCH-USD","sequence":10,"best_bid":"5.01","best_ask":"5.20"}"#,
    ];
    for frame in frames {
        router.process(decode_message(frame).unwrap()).await.unwrap();
    }

    assert_eq!(router.book_mut().best_bid(), Some(BookEntry::bid(m(5, 1), 0.5)));
    assert_eq!(exchange.buys()[0].price, m(5, 5));
    assert_eq!(router.last_sequence(), Some(10));
}

#[tokio::test]
async fn test_drift_cancel_ack_through_feed() {
    init_logger();
    let (router, exchange) = router();
    let (tx, rx) = mpsc::channel(64);
    exchange.attach(tx.downgrade());

    let mut agent = FlipAgent::new(router, Duration::from_secs(60));
    let handle = tokio::spawn(async move {
        let result = agent.run(rx).await;
        (agent, result)
    });

    tx.send(snapshot()).await.unwrap();
    tx.send(ticker(1, m(5, 0), m(5, 20))).await.unwrap();
    wait_for(|| exchange.buys().len() == 1).await;

    // Bid jumps past buy_at; repeated ticks cancel only once
    for seq in 2..5 {
        tx.send(ticker(seq, m(5, 10), m(5, 15))).await.unwrap();
    }
    wait_for(|| exchange.cancels().len() == 1).await;

    drop(tx);
    let (agent, result) = handle.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(exchange.cancels(), vec![exchange.buys()[0].id.clone()]);
    assert_eq!(agent.router().coordinator().open_count(), 0);
}

#[tokio::test]
async fn test_resync_after_out_of_order_stream() {
    init_logger();
    let (router, _exchange) = router();
    let mut agent = FlipAgent::new(router, Duration::from_secs(60));

    let (tx, rx) = mpsc::channel(8);
    for seq in [5, 6, 4] {
        tx.send(ticker(seq, m(5, 0), m(5, 5))).await.unwrap();
    }
    assert!(agent.run(rx).await.unwrap_err().is_integrity_violation());

    // A new connection starts a new sequence
    agent.router_mut().resync();
    let (tx, rx) = mpsc::channel(8);
    tx.send(snapshot()).await.unwrap();
    tx.send(ticker(1, m(5, 0), m(5, 5))).await.unwrap();
    drop(tx);
    assert!(agent.run(rx).await.is_ok());
    assert_eq!(agent.router().last_sequence(), Some(1));
}
