//! Order book errors

use spreadflip_core::{Money, Size};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("Price {price} outside accepted range (max {max})")]
    PriceOutOfRange { price: Money, max: Money },

    #[error("Invalid size {size} at {price}")]
    InvalidSize { price: Money, size: Size },

    #[error("Crossed book: bid {bid} >= ask {ask}")]
    CrossedBook { bid: Money, ask: Money },

    #[error("Book has no live bid or no live ask")]
    EmptyBook,
}

pub type BookResult<T> = std::result::Result<T, BookError>;
