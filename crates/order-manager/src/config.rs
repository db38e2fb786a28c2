//! Flip strategy configuration

use serde::{Deserialize, Serialize};
use spreadflip_core::{Money, Size};
use std::time::Duration;

use crate::error::{Error, Result};

/// Admission control and sizing for flips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipConfig {
    /// Open a flip only when the ticker spread is strictly above this
    pub min_profitable_spread: Money,
    /// Maximum number of open positions (any state)
    pub max_concurrent_positions: usize,
    /// Buy at best bid + margin, sell at best ask - margin
    pub tick_margin: Money,
    /// Fixed size of every buy and sell
    pub order_size: Size,
    /// Pause admission this long after a rejected buy
    pub admission_backoff_ms: u64,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            min_profitable_spread: Money::new(0, 10),
            max_concurrent_positions: 10,
            tick_margin: Money::new(0, 4),
            order_size: 0.00001,
            admission_backoff_ms: 50,
        }
    }
}

impl FlipConfig {
    pub fn admission_backoff(&self) -> Duration {
        Duration::from_millis(self.admission_backoff_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.order_size.is_finite() && self.order_size > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "order_size must be positive, got {}",
                self.order_size
            )));
        }
        if self.max_concurrent_positions == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent_positions must be at least 1".to_string(),
            ));
        }
        if self.tick_margin.is_negative() {
            return Err(Error::InvalidConfig(format!(
                "tick_margin must not be negative, got {}",
                self.tick_margin
            )));
        }
        // Otherwise an admitted flip could buy at or above its own sell price
        if self.min_profitable_spread <= self.tick_margin + self.tick_margin {
            return Err(Error::InvalidConfig(format!(
                "min_profitable_spread {} must exceed twice tick_margin {}",
                self.min_profitable_spread, self.tick_margin
            )));
        }
        Ok(())
    }
}
