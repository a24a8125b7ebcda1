//! DeepBook v3 integration: native encodings and Move call targets.

pub mod bcs;
pub mod decode;
pub mod orders;
pub mod scale;

pub use decode::{decode_order_id, decode_order_page, encode_order_id};
pub use orders::{scale_order, scale_orders};

/// Published DeepBook package.
pub const PACKAGE_ID: &str = "0xcaf6ba059d539a97646d47f0b9ddf843e138d215e2a12ca1f4585d386f7aec3a";
/// Shared clock object.
pub const CLOCK_OBJECT_ID: &str = "0x6";
/// Gas budget attached to every settlement transaction.
pub const GAS_BUDGET: u64 = 1_000_000_000;
/// Page size of one `order_query::iter_orders` call.
pub const ORDER_QUERY_LIMIT: u64 = 1000;

/// Self-matching option passed to market orders: self matches allowed.
pub const SELF_MATCHING_ALLOWED: u8 = 0;
/// Client order id used for arbitrage market orders.
pub const ARB_CLIENT_ORDER_ID: u64 = 1;

/// Event emitted by the balance manager on every deposit/withdrawal.
pub const BALANCE_EVENT_SUFFIX: &str = "::balance_manager::BalanceEvent";
/// Settlement event emitted by the swap aggregator.
pub const SWAP_SETTLE_EVENT_SUFFIX: &str = "::settle::Swap";
