//! Amounts read back from transaction receipts.

use crate::chain::TransactionOutcome;
use crate::deepbook::scale::{from_native, native_to_ui};
use crate::deepbook::{BALANCE_EVENT_SUFFIX, SWAP_SETTLE_EVENT_SUFFIX};
use crate::errors::{AppError, Result};
use bigdecimal::BigDecimal;

/// Amount leaving the balance manager, from the first non-deposit
/// `BalanceEvent`.
pub fn withdrawal_amount(outcome: &TransactionOutcome, decimals: u32) -> Result<BigDecimal> {
    let event = outcome
        .find_event(BALANCE_EVENT_SUFFIX, |e| e.bool_field("deposit") != Some(true))
        .ok_or_else(|| {
            AppError::EventNotFound(format!("withdrawal event in {}", outcome.digest))
        })?;
    Ok(native_to_ui(&from_native(event.u128_field("amount")?), decimals))
}

/// Realised output of an aggregator swap.
pub fn swap_output(outcome: &TransactionOutcome, decimals: u32) -> Result<BigDecimal> {
    let event = outcome
        .find_event(SWAP_SETTLE_EVENT_SUFFIX, |_| true)
        .ok_or_else(|| AppError::EventNotFound(format!("swap settle event in {}", outcome.digest)))?;
    Ok(native_to_ui(&from_native(event.u128_field("amount_out")?), decimals))
}
