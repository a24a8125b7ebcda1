use super::types::{ArbitrageOpportunity, FillEstimate};
use crate::models::TradeSide;
use bigdecimal::BigDecimal;
use num_traits::Zero;

/// Sum remaining size, quote value and oracle-relative profit over the
/// in-range orders. Exact decimal arithmetic, no intermediate rounding.
pub fn size(opportunity: &ArbitrageOpportunity) -> FillEstimate {
    let mut base_quantity = BigDecimal::zero();
    let mut quote_quantity = BigDecimal::zero();
    let mut estimated_profit = BigDecimal::zero();

    for order in &opportunity.orders {
        let remaining = order.remaining();
        let edge = match opportunity.side {
            TradeSide::Buy => &opportunity.oracle_price - &order.price,
            TradeSide::Sell => &order.price - &opportunity.oracle_price,
        };
        quote_quantity += &remaining * &order.price;
        estimated_profit += edge * &remaining;
        base_quantity += remaining;
    }

    FillEstimate {
        base_quantity,
        quote_quantity,
        estimated_profit,
    }
}

/// Quote value of taking `quantity` base from the in-range orders, best
/// price first. Quantity beyond the resting size is ignored.
pub fn quote_for_quantity(opportunity: &ArbitrageOpportunity, quantity: &BigDecimal) -> BigDecimal {
    let mut orders: Vec<_> = opportunity.orders.iter().collect();
    match opportunity.side {
        TradeSide::Buy => orders.sort_by(|a, b| a.price.cmp(&b.price)),
        TradeSide::Sell => orders.sort_by(|a, b| b.price.cmp(&a.price)),
    }

    let mut left = quantity.clone();
    let mut quote = BigDecimal::zero();
    for order in orders {
        if left <= BigDecimal::zero() {
            break;
        }
        let take = order.remaining().min(left.clone());
        quote += &take * &order.price;
        left -= take;
    }
    quote
}

impl ArbitrageOpportunity {
    pub fn size(&self) -> FillEstimate {
        size(self)
    }

    pub fn quote_for_quantity(&self, quantity: &BigDecimal) -> BigDecimal {
        quote_for_quantity(self, quantity)
    }
}
