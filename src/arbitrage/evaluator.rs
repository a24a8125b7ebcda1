use super::types::ArbitrageOpportunity;
use crate::models::{OrderSide, ScaledOrder, TradeSide};
use bigdecimal::BigDecimal;

/// Best bid and best ask of a book; `None` stands for an empty side.
pub fn best_prices(orders: &[ScaledOrder]) -> (Option<&BigDecimal>, Option<&BigDecimal>) {
    let best_bid = orders
        .iter()
        .filter(|o| o.side == OrderSide::Bid)
        .map(|o| &o.price)
        .max();
    let best_ask = orders
        .iter()
        .filter(|o| o.side == OrderSide::Ask)
        .map(|o| &o.price)
        .min();
    (best_bid, best_ask)
}

/// Compare the book against the oracle band.
///
/// An opportunity exists when the best bid is at or above
/// `oracle * (1 + slippage)` or the best ask is at or below
/// `oracle * (1 - slippage)`. When both hold, buying wins because the ask
/// side is checked first.
pub fn detect(
    oracle_price: &BigDecimal,
    orders: &[ScaledOrder],
    slippage: &BigDecimal,
) -> Option<ArbitrageOpportunity> {
    let one = BigDecimal::from(1);
    let upper = oracle_price * (&one + slippage);
    let lower = oracle_price * (&one - slippage);

    let (best_bid, best_ask) = best_prices(orders);
    // An empty side is -inf / +inf and never triggers on its own.
    let ask_triggers = best_ask.is_some_and(|ask| *ask <= lower);
    let bid_triggers = best_bid.is_some_and(|bid| *bid >= upper);

    let side = if ask_triggers {
        TradeSide::Buy
    } else if bid_triggers {
        TradeSide::Sell
    } else {
        return None;
    };

    let in_range: Vec<ScaledOrder> = orders
        .iter()
        .filter(|o| o.side == side.consumes())
        .filter(|o| match side {
            TradeSide::Buy => o.price <= lower,
            TradeSide::Sell => o.price >= upper,
        })
        .cloned()
        .collect();

    Some(ArbitrageOpportunity {
        oracle_price: oracle_price.clone(),
        upper,
        lower,
        side,
        orders: in_range,
    })
}
