//! Error types for the gateway crate

use spreadflip_core::MoneyError;
use thiserror::Error;

/// Feed payload decoding errors
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message has no type field")]
    MissingType,

    #[error("Invalid {field}: {source}")]
    Money {
        field: &'static str,
        source: MoneyError,
    },

    #[error("Invalid size: {0:?}")]
    Size(String),

    #[error("Invalid side: {0:?}")]
    Side(String),

    #[error("Book level has {0} fields")]
    Arity(usize),

    #[error("Unknown done reason: {0:?}")]
    DoneReason(String),
}

/// Gateway-level errors (connection and adapter operations)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
