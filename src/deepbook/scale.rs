//! Exact conversions between the venue's native integers and UI decimals.
//!
//! Every conversion is a power-of-ten shift, so it is carried out by moving
//! the decimal exponent of a `BigDecimal` instead of dividing. Nothing here
//! rounds except [`to_native_units`] and [`round_to_lot`], which truncate.

use crate::errors::{AppError, Result};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use std::str::FromStr;

/// Protocol-wide price scalar exponent (prices carry an extra `10^9`).
pub const PRICE_SCALAR_EXPONENT: i64 = 9;

/// Parse a decimal string, rejecting anything that is not a plain number.
pub fn parse_decimal(raw: &str) -> Result<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Parse("empty numeric string".into()));
    }
    BigDecimal::from_str(trimmed).map_err(|e| AppError::Parse(format!("{raw:?}: {e}")))
}

/// Canonical plain rendering: no exponent, no trailing fractional zeros.
pub fn format_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.normalized().as_bigint_and_exponent();
    let mut out = digits.magnitude().to_string();
    if scale <= 0 {
        out.push_str(&"0".repeat(scale.unsigned_abs() as usize));
    } else {
        let scale = scale as usize;
        if out.len() <= scale {
            out = format!("{}{}", "0".repeat(scale - out.len() + 1), out);
        }
        out.insert(out.len() - scale, '.');
    }
    if digits.sign() == Sign::Minus {
        out.insert(0, '-');
    }
    out
}

/// Lift a native integer amount into a decimal.
pub fn from_native(native: u128) -> BigDecimal {
    BigDecimal::new(BigInt::from(native), 0)
}

/// `value * 10^places`, exactly.
fn shift(value: &BigDecimal, places: i64) -> BigDecimal {
    let (digits, scale) = value.as_bigint_and_exponent();
    BigDecimal::new(digits, scale - places)
}

pub fn native_to_ui(native: &BigDecimal, decimals: u32) -> BigDecimal {
    shift(native, -i64::from(decimals))
}

pub fn ui_to_native(ui: &BigDecimal, decimals: u32) -> BigDecimal {
    shift(ui, i64::from(decimals))
}

/// Venue price to quote-per-base: `native / 10^9 * 10^base / 10^quote`.
pub fn to_ui_price(native: &BigDecimal, base_decimals: u32, quote_decimals: u32) -> BigDecimal {
    shift(
        native,
        i64::from(base_decimals) - PRICE_SCALAR_EXPONENT - i64::from(quote_decimals),
    )
}

/// Inverse of [`to_ui_price`].
pub fn to_native_price(ui: &BigDecimal, base_decimals: u32, quote_decimals: u32) -> BigDecimal {
    shift(
        ui,
        PRICE_SCALAR_EXPONENT + i64::from(quote_decimals) - i64::from(base_decimals),
    )
}

/// Native integer argument for a transaction, truncated toward zero.
pub fn to_native_units(ui: &BigDecimal, decimals: u32) -> Result<u64> {
    if *ui < BigDecimal::zero() {
        return Err(AppError::Parse(format!(
            "negative amount {}",
            format_decimal(ui)
        )));
    }
    let (whole, _) = ui_to_native(ui, decimals).with_scale(0).as_bigint_and_exponent();
    whole.to_u64().ok_or_else(|| {
        AppError::Parse(format!("amount {} overflows u64", format_decimal(ui)))
    })
}

/// Round a non-negative quantity down to a whole number of lots.
pub fn round_to_lot(quantity: &BigDecimal, lot_size: &BigDecimal) -> BigDecimal {
    if *lot_size <= BigDecimal::zero() {
        return quantity.clone();
    }
    let scale = quantity
        .as_bigint_and_exponent()
        .1
        .max(lot_size.as_bigint_and_exponent().1)
        .max(0);
    let (q, _) = quantity.with_scale(scale).as_bigint_and_exponent();
    let (lot, _) = lot_size.with_scale(scale).as_bigint_and_exponent();
    BigDecimal::new((q / &lot) * lot, scale)
}
