mod money;

pub use money::{MONEY_SCALE, Money, MoneyError};

/// Order size in base currency units
/// Future: could become a newtype with validation (non-negative, lot size)
pub type Size = f64;
