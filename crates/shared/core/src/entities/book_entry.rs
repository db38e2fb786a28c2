use serde::{Deserialize, Serialize};

use super::Side;
use crate::values::{Money, Size};

/// Aggregate resting size at one price level.
///
/// A size of zero is a removal signal for that price, never a level to report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub side: Side,
    pub price: Money,
    pub size: Size,
}

impl BookEntry {
    pub fn new(side: Side, price: Money, size: Size) -> Self {
        Self { side, price, size }
    }

    pub fn bid(price: Money, size: Size) -> Self {
        Self::new(Side::Buy, price, size)
    }

    pub fn ask(price: Money, size: Size) -> Self {
        Self::new(Side::Sell, price, size)
    }

    /// Check if this entry removes its level (size == 0)
    pub fn is_removal(&self) -> bool {
        self.size == 0.0
    }
}
