pub mod evaluator;
pub mod sizing;
pub mod types;

pub use evaluator::{best_prices, detect};
pub use sizing::{quote_for_quantity, size};
pub use types::{ArbitrageOpportunity, FillEstimate};
