use crate::models::{ScaledOrder, TradeSide};
use bigdecimal::BigDecimal;

/// A detected mispricing between the oracle and the resting book.
#[derive(Debug, Clone)]
pub struct ArbitrageOpportunity {
    pub oracle_price: BigDecimal,
    /// `oracle * (1 + slippage)`
    pub upper: BigDecimal,
    /// `oracle * (1 - slippage)`
    pub lower: BigDecimal,
    pub side: TradeSide,
    /// Resting orders at or beyond the boundary on the consumed side.
    /// Never empty.
    pub orders: Vec<ScaledOrder>,
}

/// Aggregate size and value of the orders an opportunity would consume.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEstimate {
    /// Base units still resting on the in-range orders.
    pub base_quantity: BigDecimal,
    /// Quote value of `base_quantity` at the resting prices.
    pub quote_quantity: BigDecimal,
    /// Quote units gained against the oracle price, fees excluded.
    pub estimated_profit: BigDecimal,
}
