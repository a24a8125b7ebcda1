use crate::deepbook::scale::{from_native, native_to_ui, to_ui_price};
use crate::errors::{AppError, Result};
use crate::models::{OrderRecord, ScaledOrder, format_address};

/// Convert a decoded record into UI units. Quantities are base-asset amounts.
pub fn scale_order(record: &OrderRecord, base_decimals: u32, quote_decimals: u32) -> Result<ScaledOrder> {
    if record.filled_quantity > record.quantity {
        return Err(AppError::Decode(format!(
            "order {} filled {} of {}",
            record.order_id, record.filled_quantity, record.quantity
        )));
    }
    Ok(ScaledOrder {
        balance_manager_id: format_address(&record.balance_manager_id),
        order_id: record.order_id,
        client_order_id: record.client_order_id,
        side: record.decoded.side,
        price: to_ui_price(
            &from_native(u128::from(record.decoded.price)),
            base_decimals,
            quote_decimals,
        ),
        quantity: native_to_ui(&from_native(u128::from(record.quantity)), base_decimals),
        filled_quantity: native_to_ui(
            &from_native(u128::from(record.filled_quantity)),
            base_decimals,
        ),
        status: record.status,
        expire_timestamp: record.expire_timestamp,
    })
}

pub fn scale_orders(
    records: &[OrderRecord],
    base_decimals: u32,
    quote_decimals: u32,
) -> Result<Vec<ScaledOrder>> {
    records
        .iter()
        .map(|r| scale_order(r, base_decimals, quote_decimals))
        .collect()
}
