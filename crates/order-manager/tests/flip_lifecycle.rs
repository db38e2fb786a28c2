//! Flip lifecycle against the paper exchange
//!
//! Walks several positions through their full lives at once:
//! 1. A wide spread opens positions up to the concurrency cap
//! 2. Buy fills flip into sells at the recorded sell price
//! 3. Price drift cancels the buys that are still resting
//! 4. Sell fills and cancel acks retire everything

use spreadflip_core::{Money, OrderId, ProductId, Side};
use spreadflip_gateway::{FeedEvent, PaperExchange};
use spreadflip_order_manager::{FlipConfig, FlipCoordinator, PositionState};
use std::sync::Arc;
use tokio::sync::mpsc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn m(major: i64, minor: i64) -> Money {
    Money::new(major, minor)
}

async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_positions_through_full_lifecycle() {
    init_logger();

    let exchange = Arc::new(PaperExchange::new());
    let config = FlipConfig {
        max_concurrent_positions: 3,
        ..Default::default()
    };
    let mut coordinator = FlipCoordinator::new(ProductId::new("BCH-USD"), config, exchange.clone());

    // === Step 1: open up to the cap ===
    let mut opened = Vec::new();
    for _ in 0..5 {
        if let Some(id) = coordinator.on_tick(m(5, 0), m(5, 20), m(0, 20)).await {
            opened.push(id);
        }
    }
    assert_eq!(opened.len(), 3);
    assert!(exchange.buys().iter().all(|o| o.price == m(5, 4)));

    // === Step 2: two buys fill ===
    coordinator.on_fill(&opened[0], Side::Buy).unwrap();
    coordinator.on_fill(&opened[1], Side::Buy).unwrap();
    settle().await;

    let sells = exchange.sells();
    assert_eq!(sells.len(), 2);
    assert!(sells.iter().all(|o| o.price == m(5, 16) && o.size == 0.00001));

    // === Step 3: market drifts, only the resting buy is cancelled ===
    for _ in 0..3 {
        coordinator.on_tick(m(5, 10), m(5, 14), m(0, 4)).await;
        settle().await;
    }
    assert_eq!(exchange.cancels(), vec![opened[2].clone()]);
    assert_eq!(
        coordinator.position(&opened[2]).unwrap().state,
        PositionState::Cancelling
    );

    // === Step 4: sells fill and the cancel is acknowledged ===
    for sell in &sells {
        coordinator.on_fill(&sell.id, Side::Sell).unwrap();
    }
    coordinator.on_cancel(&opened[2]);
    assert_eq!(coordinator.open_count(), 0);

    // A late duplicate is harmless
    coordinator.on_cancel(&opened[2]);
    assert_eq!(coordinator.open_count(), 0);
}

#[tokio::test]
async fn test_cancel_ack_arrives_on_feed() {
    init_logger();

    let exchange = Arc::new(PaperExchange::new());
    let (tx, mut feed) = mpsc::channel(16);
    exchange.attach(tx.downgrade());

    let mut coordinator =
        FlipCoordinator::new(ProductId::new("BCH-USD"), FlipConfig::default(), exchange.clone());
    let id = coordinator
        .on_tick(m(5, 0), m(5, 20), m(0, 20))
        .await
        .unwrap();

    coordinator.on_tick(m(5, 10), m(5, 15), m(0, 5)).await;

    let ack = feed.recv().await.unwrap();
    assert_eq!(ack, FeedEvent::cancel(id.clone()).with_product("BCH-USD"));
    if let FeedEvent::Cancel { order_id, .. } = ack {
        coordinator.on_cancel(&order_id);
    }
    assert!(coordinator.position(&id).is_none());
}

#[tokio::test]
async fn test_fill_for_unknown_buy_is_reported() {
    init_logger();

    let mut coordinator = FlipCoordinator::new(
        ProductId::new("BCH-USD"),
        FlipConfig::default(),
        Arc::new(PaperExchange::new()),
    );
    assert!(coordinator.on_fill(&OrderId::new("ghost"), Side::Buy).is_err());
}
