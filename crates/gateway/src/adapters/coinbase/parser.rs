use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use spreadflip_core::{BookEntry, Money, ProductId, Side, Size};

use super::wire::{DoneWire, ErrorWire, HeartbeatWire, L2UpdateWire, SnapshotWire, TickerWire};
use crate::error::DecodeError;
use crate::messages::{BookDelta, BookSnapshot, FeedEvent, Ticker};

/// Decode one text frame into a domain event.
///
/// Unknown message types are not errors; they decode to
/// [`FeedEvent::Unrecognized`] so the consumer decides what to do.
pub fn decode_message(text: &str) -> Result<FeedEvent, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_string();

    match kind.as_str() {
        "snapshot" => decode_snapshot(payload(value)?),
        "l2update" => decode_l2update(payload(value)?),
        "ticker" => decode_ticker(payload(value)?),
        "done" => decode_done(payload(value)?),
        "heartbeat" => {
            let hb: HeartbeatWire = payload(value)?;
            Ok(FeedEvent::Heartbeat {
                sequence: hb.sequence,
            })
        }
        "subscriptions" => Ok(FeedEvent::Subscribed),
        "error" => {
            let err: ErrorWire = payload(value)?;
            let message = match err.reason {
                Some(reason) => format!("{}: {}", err.message, reason),
                None => err.message,
            };
            Ok(FeedEvent::Error { message })
        }
        _ => {
            debug!("Unrecognized feed message type: {}", kind);
            Ok(FeedEvent::Unrecognized { kind })
        }
    }
}

fn payload<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    Ok(serde_json::from_value(value)?)
}

fn decode_snapshot(wire: SnapshotWire) -> Result<FeedEvent, DecodeError> {
    let bids = wire
        .bids
        .iter()
        .map(|level| parse_level(Side::Buy, level))
        .collect::<Result<Vec<_>, _>>()?;
    let asks = wire
        .asks
        .iter()
        .map(|level| parse_level(Side::Sell, level))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedEvent::Snapshot(BookSnapshot {
        product_id: ProductId::new(wire.product_id),
        bids,
        asks,
    }))
}

fn decode_l2update(wire: L2UpdateWire) -> Result<FeedEvent, DecodeError> {
    let changes = wire
        .changes
        .iter()
        .map(|change| match change.as_slice() {
            [side, price, size] => Ok(BookEntry::new(
                parse_side(side)?,
                parse_money("price", price)?,
                parse_size(size)?,
            )),
            other => Err(DecodeError::Arity(other.len())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeedEvent::Delta(BookDelta {
        product_id: ProductId::new(wire.product_id),
        changes,
        time: wire.time,
    }))
}

fn decode_ticker(wire: TickerWire) -> Result<FeedEvent, DecodeError> {
    let price = wire
        .price
        .as_deref()
        .map(|p| parse_money("price", p))
        .transpose()?;

    Ok(FeedEvent::Ticker(Ticker {
        product_id: ProductId::new(wire.product_id),
        sequence: wire.sequence,
        best_bid: parse_money("best_bid", &wire.best_bid)?,
        best_ask: parse_money("best_ask", &wire.best_ask)?,
        price,
        time: wire.time,
    }))
}

fn decode_done(wire: DoneWire) -> Result<FeedEvent, DecodeError> {
    let side = parse_side(&wire.side)?;
    let event = match wire.reason.as_str() {
        "filled" => FeedEvent::fill(wire.order_id, side),
        "canceled" => FeedEvent::cancel(wire.order_id),
        _ => return Err(DecodeError::DoneReason(wire.reason)),
    };
    Ok(match wire.product_id {
        Some(product) => event.with_product(product),
        None => event,
    })
}

/// Snapshot levels are `[price, size]`; a trailing order count is tolerated
fn parse_level(side: Side, level: &[String]) -> Result<BookEntry, DecodeError> {
    match level {
        [price, size] | [price, size, _] => Ok(BookEntry::new(
            side,
            parse_money("price", price)?,
            parse_size(size)?,
        )),
        other => Err(DecodeError::Arity(other.len())),
    }
}

fn parse_money(field: &'static str, s: &str) -> Result<Money, DecodeError> {
    s.parse()
        .map_err(|source| DecodeError::Money { field, source })
}

fn parse_size(s: &str) -> Result<Size, DecodeError> {
    s.trim()
        .parse::<Size>()
        .map_err(|_| DecodeError::Size(s.to_string()))
}

fn parse_side(s: &str) -> Result<Side, DecodeError> {
    match s {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(DecodeError::Side(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_snapshot() {
        let text = r#"{
            "type": "snapshot",
            "product_id": "BCH-USD",
            "bids": [["5.00", "1.5"], ["4.98", "2.0"]],
            "asks": [["5.20", "0.75"]]
        }"#;

        let FeedEvent::Snapshot(snapshot) = decode_message(text).unwrap() else {
            panic!("expected snapshot");
        };
        assert_eq!(snapshot.product_id.as_str(), "BCH-USD");
        assert_eq!(snapshot.bids.len(), 2);
        assert_eq!(snapshot.bids[0], BookEntry::bid(Money::new(5, 0), 1.5));
        assert_eq!(snapshot.asks, vec![BookEntry::ask(Money::new(5, 20), 0.75)]);
    }

    #[test]
    fn test_decode_l2update() {
        let text = r#"{
            "type": "l2update",
            "product_id": "BCH-USD",
            "time": "2019-08-14T20:42:27.265Z",
            "changes": [["buy", "5.01000000", "0.162567"], ["sell", "5.30", "0"]]
        }"#;

        let FeedEvent::Delta(delta) = decode_message(text).unwrap() else {
            panic!("expected delta");
        };
        assert!(delta.time.is_some());
        assert_eq!(delta.changes[0], BookEntry::bid(Money::new(5, 1), 0.162567));
        assert!(delta.changes[1].is_removal());
        assert_eq!(delta.changes[1].side, Side::Sell);
    }

    #[test]
    fn test_decode_ticker() {
        let text = r#"{
            "type": "ticker",
            "sequence": 42,
            "product_id": "BCH-USD",
            "price": "5.10",
            "best_bid": "5.00",
            "best_ask": "5.20"
        }"#;

        let FeedEvent::Ticker(ticker) = decode_message(text).unwrap() else {
            panic!("expected ticker");
        };
        assert_eq!(ticker.sequence, 42);
        assert_eq!(ticker.price, Some(Money::new(5, 10)));
        assert_eq!(ticker.spread(), Money::new(0, 20));
    }

    #[test]
    fn test_decode_done() {
        let filled = r#"{"type":"done","order_id":"abc","reason":"filled","side":"buy"}"#;
        assert_eq!(
            decode_message(filled).unwrap(),
            FeedEvent::fill("abc", Side::Buy)
        );

        let canceled = r#"{"type":"done","order_id":"abc","reason":"canceled","side":"sell"}"#;
        assert_eq!(decode_message(canceled).unwrap(), FeedEvent::cancel("abc"));

        let tagged = r#"{"type":"done","order_id":"abc","product_id":"ETH-USD","reason":"filled","side":"sell"}"#;
        let event = decode_message(tagged).unwrap();
        assert_eq!(event, FeedEvent::fill("abc", Side::Sell).with_product("ETH-USD"));
        assert_eq!(event.product_id(), Some(&ProductId::new("ETH-USD")));

        let odd = r#"{"type":"done","order_id":"abc","reason":"expired","side":"sell"}"#;
        assert!(matches!(
            decode_message(odd),
            Err(DecodeError::DoneReason(_))
        ));
    }

    #[test]
    fn test_decode_control_messages() {
        assert_eq!(
            decode_message(r#"{"type":"heartbeat","sequence":9,"product_id":"BCH-USD"}"#)
                .unwrap(),
            FeedEvent::Heartbeat { sequence: 9 }
        );
        assert_eq!(
            decode_message(r#"{"type":"subscriptions","channels":[]}"#).unwrap(),
            FeedEvent::Subscribed
        );
        assert_eq!(
            decode_message(r#"{"type":"error","message":"Failed to subscribe","reason":"bad product"}"#)
                .unwrap(),
            FeedEvent::Error {
                message: "Failed to subscribe: bad product".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_type_is_unrecognized() {
        assert_eq!(
            decode_message(r#"{"type":"last_match","trade_id":1}"#).unwrap(),
            FeedEvent::Unrecognized {
                kind: "last_match".to_string()
            }
        );
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(matches!(
            decode_message("not json"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_message(r#"{"product_id":"BCH-USD"}"#),
            Err(DecodeError::MissingType)
        ));
        assert!(matches!(
            decode_message(r#"{"type":"snapshot","product_id":"X","bids":[["5.001","1"]],"asks":[]}"#),
            Err(DecodeError::Money { field: "price", .. })
        ));
        assert!(matches!(
            decode_message(r#"{"type":"snapshot","product_id":"X","bids":[["5.00"]],"asks":[]}"#),
            Err(DecodeError::Arity(1))
        ));
        assert!(matches!(
            decode_message(r#"{"type":"l2update","product_id":"X","changes":[["hold","5.00","1"]]}"#),
            Err(DecodeError::Side(_))
        ));
        assert!(matches!(
            decode_message(r#"{"type":"l2update","product_id":"X","changes":[["buy","5.00","lots"]]}"#),
            Err(DecodeError::Size(_))
        ));
    }

    #[test]
    fn test_subscribe_request_shape() {
        let request = super::super::SubscribeRequest::new(
            &ProductId::new("BCH-USD"),
            &["heartbeat".to_string(), "ticker".to_string()],
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "subscribe");
        assert_eq!(json["product_ids"][0], "BCH-USD");
        assert_eq!(json["channels"][1], "ticker");
    }
}
