//! Randomised update sequences against a naive model of the book.
//!
//! Bids live in 4.00..=4.99 and asks in 5.00..=5.99 so no sequence can
//! cross; crossing is covered by the unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spreadflip_core::{BookEntry, Money, Side};
use spreadflip_strategy::OrderBook;
use std::collections::BTreeMap;

fn random_update(rng: &mut StdRng) -> BookEntry {
    let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
    let base = match side {
        Side::Buy => 400,
        Side::Sell => 500,
    };
    let price = Money::from_minor(base + rng.gen_range(0..100));
    // Roughly a third of updates are removals
    let size = if rng.gen_range(0..3) == 0 {
        0.0
    } else {
        f64::from(rng.gen_range(1..50u32)) / 10.0
    };
    BookEntry::new(side, price, size)
}

fn apply_to_model(model: &mut BTreeMap<Money, f64>, entry: &BookEntry) {
    if entry.size == 0.0 {
        model.remove(&entry.price);
    } else {
        model.insert(entry.price, entry.size);
    }
}

#[test]
fn test_best_prices_match_model_after_every_update() {
    let _ = env_logger::try_init();

    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut book = OrderBook::default();
        let mut bids = BTreeMap::new();
        let mut asks = BTreeMap::new();

        for _ in 0..500 {
            let entry = random_update(&mut rng);
            book.update(entry).unwrap();
            match entry.side {
                Side::Buy => apply_to_model(&mut bids, &entry),
                Side::Sell => apply_to_model(&mut asks, &entry),
            }

            let expected_bid = bids.iter().next_back().map(|(p, s)| BookEntry::bid(*p, *s));
            let expected_ask = asks.iter().next().map(|(p, s)| BookEntry::ask(*p, *s));
            assert_eq!(book.best_bid(), expected_bid, "seed {}", seed);
            assert_eq!(book.best_ask(), expected_ask, "seed {}", seed);
        }
    }
}

#[test]
fn test_dump_matches_model_order() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut book = OrderBook::default();
    let mut bids = BTreeMap::new();
    let mut asks = BTreeMap::new();

    for _ in 0..1000 {
        let entry = random_update(&mut rng);
        book.update(entry).unwrap();
        match entry.side {
            Side::Buy => apply_to_model(&mut bids, &entry),
            Side::Sell => apply_to_model(&mut asks, &entry),
        }
    }

    let dumped_bids: Vec<(Money, f64)> = book
        .dump(Side::Buy)
        .into_iter()
        .map(|e| (e.price, e.size))
        .collect();
    let expected_bids: Vec<(Money, f64)> = bids.into_iter().rev().collect();
    assert_eq!(dumped_bids, expected_bids);

    let dumped_asks: Vec<(Money, f64)> = book
        .dump(Side::Sell)
        .into_iter()
        .map(|e| (e.price, e.size))
        .collect();
    let expected_asks: Vec<(Money, f64)> = asks.into_iter().collect();
    assert_eq!(dumped_asks, expected_asks);

    assert!(book.is_empty());
}

#[test]
fn test_size_never_exceeds_distinct_prices() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut book = OrderBook::default();

    for _ in 0..2000 {
        book.update(random_update(&mut rng)).unwrap();
        // 100 bid prices + 100 ask prices, tombstones included
        assert!(book.size() <= 200);
    }
}
