//! Oracle price feeds.
//!
//! Responsibilities:
//! • Return the latest attested price of one feed as an exact decimal.
//! • Report any transport or payload problem as `OracleUnavailable`.

use crate::errors::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;

pub mod pyth;

pub use pyth::HermesClient;

#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Latest price of `price_id` in quote units per base unit.
    async fn price(&self, price_id: &str) -> Result<BigDecimal>;
}
