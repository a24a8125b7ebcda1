//! Shared data structures used throughout the application.

use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::fmt;

/// Wallet balances keyed by coin type, in native units.
pub type Balances = HashMap<String, u128>;

/// Side of a resting order as encoded in its packed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSide {
    Bid,
    Ask,
}

impl OrderSide {
    pub fn is_bid(self) -> bool {
        matches!(self, OrderSide::Bid)
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Bid => f.write_str("bid"),
            OrderSide::Ask => f.write_str("ask"),
        }
    }
}

/// Direction of the arbitrage market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    /// Take resting asks that sit below the oracle band.
    Buy,
    /// Hit resting bids that sit above the oracle band.
    Sell,
}

impl TradeSide {
    /// `is_bid` flag of the venue's market order.
    pub fn is_bid(self) -> bool {
        matches!(self, TradeSide::Buy)
    }

    /// Book side consumed by an order in this direction.
    pub fn consumes(self) -> OrderSide {
        match self {
            TradeSide::Buy => OrderSide::Ask,
            TradeSide::Sell => OrderSide::Bid,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => f.write_str("BUY"),
            TradeSide::Sell => f.write_str("SELL"),
        }
    }
}

/// Fields packed into a venue order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedOrderId {
    pub side: OrderSide,
    /// Price in the venue's native price units.
    pub price: u64,
    pub sequence: u64,
}

/// Fee-in-DEEP conversion rate recorded on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDeepPrice {
    pub asset_is_base: bool,
    pub deep_per_asset: u64,
}

/// A resting order exactly as the venue reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub balance_manager_id: [u8; 32],
    pub order_id: u128,
    pub client_order_id: u64,
    pub quantity: u64,
    pub filled_quantity: u64,
    pub fee_is_deep: bool,
    pub order_deep_price: OrderDeepPrice,
    pub epoch: u64,
    pub status: u8,
    pub expire_timestamp: u64,
    /// Derived from `order_id` at decode time.
    pub decoded: DecodedOrderId,
}

/// One page of an order-book iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPage {
    pub orders: Vec<OrderRecord>,
    pub has_next_page: bool,
}

/// A resting order with price and quantities in UI units.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledOrder {
    pub balance_manager_id: String,
    pub order_id: u128,
    pub client_order_id: u64,
    pub side: OrderSide,
    /// Quote units per one base unit.
    pub price: BigDecimal,
    /// Base units.
    pub quantity: BigDecimal,
    /// Base units, never above `quantity`.
    pub filled_quantity: BigDecimal,
    pub status: u8,
    pub expire_timestamp: u64,
}

impl ScaledOrder {
    /// Quantity still resting on the book.
    pub fn remaining(&self) -> BigDecimal {
        &self.quantity - &self.filled_quantity
    }
}

/// Render a 32-byte account id the way the chain prints it.
pub fn format_address(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}
