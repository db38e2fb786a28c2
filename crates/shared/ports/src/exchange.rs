use async_trait::async_trait;
use spreadflip_core::{Money, OrderId, ProductId, Size};

use crate::error::ExchangeResult;

/// Port for order placement on the venue
///
/// Request signing and HTTP mechanics live behind this trait:
/// - REST clients for real venues
/// - The in-memory paper exchange for dry runs and tests
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Place a limit buy, returning the venue's order id
    async fn buy(&self, product: &ProductId, price: Money, size: Size) -> ExchangeResult<OrderId>;

    /// Place a limit sell, returning the venue's order id
    async fn sell(&self, product: &ProductId, price: Money, size: Size)
    -> ExchangeResult<OrderId>;

    /// Cancel a resting order
    async fn cancel(&self, order_id: &OrderId) -> ExchangeResult<()>;

    /// Venue name for logging
    fn name(&self) -> &str {
        "Exchange"
    }
}
