//! Decoding of the venue's packed order ids and order-page query results.

use crate::deepbook::bcs::BcsReader;
use crate::errors::Result;
use crate::models::{DecodedOrderId, OrderDeepPrice, OrderPage, OrderRecord, OrderSide};

const PRICE_MASK: u128 = (1u128 << 63) - 1;
const SEQUENCE_MASK: u128 = (1u128 << 64) - 1;

/// Encoded size of one order record; the lower bound used to reject
/// vector lengths that cannot fit in the buffer.
pub const ORDER_RECORD_SIZE: usize = 32 + 16 + 8 + 8 + 8 + 1 + (1 + 8) + 8 + 1 + 8;

/// Split a packed order id: bit 127 is the side (0 bid, 1 ask), bits
/// 64..=126 the native price, bits 0..=63 the sequence number.
pub fn decode_order_id(order_id: u128) -> DecodedOrderId {
    let side = if order_id >> 127 == 0 {
        OrderSide::Bid
    } else {
        OrderSide::Ask
    };
    DecodedOrderId {
        side,
        price: ((order_id >> 64) & PRICE_MASK) as u64,
        sequence: (order_id & SEQUENCE_MASK) as u64,
    }
}

/// The venue's packing. Prices above 63 bits are masked.
pub fn encode_order_id(side: OrderSide, price: u64, sequence: u64) -> u128 {
    let side_bit = match side {
        OrderSide::Bid => 0u128,
        OrderSide::Ask => 1u128,
    };
    (side_bit << 127) | ((u128::from(price) & PRICE_MASK) << 64) | u128::from(sequence)
}

fn read_order(r: &mut BcsReader<'_>) -> Result<OrderRecord> {
    let balance_manager_id = r.read_address()?;
    let order_id = r.read_u128()?;
    let client_order_id = r.read_u64()?;
    let quantity = r.read_u64()?;
    let filled_quantity = r.read_u64()?;
    let fee_is_deep = r.read_bool()?;
    let order_deep_price = OrderDeepPrice {
        asset_is_base: r.read_bool()?,
        deep_per_asset: r.read_u64()?,
    };
    let epoch = r.read_u64()?;
    let status = r.read_u8()?;
    let expire_timestamp = r.read_u64()?;

    Ok(OrderRecord {
        balance_manager_id,
        order_id,
        client_order_id,
        quantity,
        filled_quantity,
        fee_is_deep,
        order_deep_price,
        epoch,
        status,
        expire_timestamp,
        decoded: decode_order_id(order_id),
    })
}

/// Decode one `OrderPage { orders: vector<Order>, has_next_page: bool }`.
pub fn decode_order_page(bytes: &[u8]) -> Result<OrderPage> {
    let mut r = BcsReader::new(bytes);
    let len = r.read_len(ORDER_RECORD_SIZE)?;
    let mut orders = Vec::with_capacity(len);
    for _ in 0..len {
        orders.push(read_order(&mut r)?);
    }
    let has_next_page = r.read_bool()?;
    r.finish()?;
    Ok(OrderPage {
        orders,
        has_next_page,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::deepbook::bcs::BcsWriter;
    use crate::errors::AppError;

    pub(crate) fn sample_record(side: OrderSide, price: u64, quantity: u64, filled: u64) -> OrderRecord {
        let order_id = encode_order_id(side, price, 7);
        OrderRecord {
            balance_manager_id: [0xab; 32],
            order_id,
            client_order_id: 42,
            quantity,
            filled_quantity: filled,
            fee_is_deep: true,
            order_deep_price: OrderDeepPrice {
                asset_is_base: false,
                deep_per_asset: 1_000,
            },
            epoch: 600,
            status: 0,
            expire_timestamp: u64::MAX,
            decoded: decode_order_id(order_id),
        }
    }

    pub(crate) fn encode_page(orders: &[OrderRecord], has_next_page: bool) -> Vec<u8> {
        let mut w = BcsWriter::new();
        w.write_uleb128(orders.len());
        for o in orders {
            w.write_address(&o.balance_manager_id)
                .write_u128(o.order_id)
                .write_u64(o.client_order_id)
                .write_u64(o.quantity)
                .write_u64(o.filled_quantity)
                .write_bool(o.fee_is_deep)
                .write_bool(o.order_deep_price.asset_is_base)
                .write_u64(o.order_deep_price.deep_per_asset)
                .write_u64(o.epoch)
                .write_u8(o.status)
                .write_u64(o.expire_timestamp);
        }
        w.write_bool(has_next_page);
        w.into_bytes()
    }

    #[test]
    fn ask_bit_price_and_sequence() {
        let id = (1u128 << 127) | (12345u128 << 64) | 9;
        let decoded = decode_order_id(id);
        assert_eq!(decoded.side, OrderSide::Ask);
        assert_eq!(decoded.price.to_string(), "12345");
        assert_eq!(decoded.sequence.to_string(), "9");
    }

    #[test]
    fn field_round_trip_at_extremes() {
        let max_price = (1u64 << 63) - 1;
        for side in [OrderSide::Bid, OrderSide::Ask] {
            for price in [0, 1, 12345, max_price] {
                for sequence in [0, 9, u64::MAX] {
                    let decoded = decode_order_id(encode_order_id(side, price, sequence));
                    assert_eq!(decoded, DecodedOrderId { side, price, sequence });
                }
            }
        }
    }

    #[test]
    fn decode_is_total() {
        let all_ones = decode_order_id(u128::MAX);
        assert_eq!(all_ones.side, OrderSide::Ask);
        assert_eq!(all_ones.price, (1u64 << 63) - 1);
        assert_eq!(all_ones.sequence, u64::MAX);
        let zero = decode_order_id(0);
        assert_eq!(zero.side, OrderSide::Bid);
        assert_eq!((zero.price, zero.sequence), (0, 0));
    }

    #[test]
    fn packed_ids_sort_by_price_within_side() {
        let low = encode_order_id(OrderSide::Ask, 100, u64::MAX);
        let high = encode_order_id(OrderSide::Ask, 101, 0);
        assert!(low < high);
    }

    #[test]
    fn page_decodes_records_and_flag() {
        let orders = vec![
            sample_record(OrderSide::Bid, 1_000_000, 5_000, 0),
            sample_record(OrderSide::Ask, 2_000_000, 8_000, 1_000),
        ];
        let page = decode_order_page(&encode_page(&orders, true)).unwrap();
        assert!(page.has_next_page);
        assert_eq!(page.orders, orders);
        assert_eq!(page.orders[1].decoded.price, 2_000_000);
    }

    #[test]
    fn empty_page() {
        let page = decode_order_page(&[0x00, 0x00]).unwrap();
        assert!(page.orders.is_empty());
        assert!(!page.has_next_page);
    }

    #[test]
    fn truncated_page_fails() {
        let bytes = encode_page(&[sample_record(OrderSide::Bid, 1, 1, 0)], false);
        let err = decode_order_page(&bytes[..bytes.len() - 10]).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
        // missing trailing flag only
        let err = decode_order_page(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn trailing_bytes_fail() {
        let mut bytes = encode_page(&[], true);
        bytes.push(0);
        assert!(matches!(decode_order_page(&bytes), Err(AppError::Decode(_))));
    }

    #[test]
    fn overrunning_vector_length_fails() {
        let mut bytes = encode_page(&[sample_record(OrderSide::Ask, 1, 1, 0)], false);
        bytes[0] = 3;
        assert!(matches!(decode_order_page(&bytes), Err(AppError::Decode(_))));
    }

    #[test]
    fn invalid_bool_in_record_fails() {
        let mut bytes = encode_page(&[sample_record(OrderSide::Ask, 1, 1, 0)], false);
        // fee_is_deep sits after address, id and three u64s, behind the 1-byte length
        bytes[1 + 32 + 16 + 24] = 7;
        assert!(matches!(decode_order_page(&bytes), Err(AppError::Decode(_))));
    }
}
