use crate::chain::Transaction;
use crate::config::StrategyConfig;
use crate::deepbook::{
    ARB_CLIENT_ORDER_ID, CLOCK_OBJECT_ID, GAS_BUDGET, PACKAGE_ID, SELF_MATCHING_ALLOWED,
};
use crate::errors::Result;
use crate::markets::AssetConfig;
use crate::models::TradeSide;

/// Deposit into the balance manager, take the book with a market order,
/// withdraw the proceeds and send them to the wallet. One transaction.
pub fn deposit_and_trade(
    strategy: &StrategyConfig,
    side: TradeSide,
    deposit: &AssetConfig,
    deposit_amount: u64,
    withdraw: &AssetConfig,
    quantity: u64,
) -> Result<Transaction> {
    let mut tx = Transaction::new();
    let coin = tx.coin_with_balance(&deposit.coin_type, deposit_amount);
    let manager = tx.object(&strategy.balance_manager_id);
    tx.move_call(
        &format!("{PACKAGE_ID}::balance_manager::deposit"),
        &[deposit.coin_type.as_str()],
        vec![manager, coin],
    )?;
    let proof = tx.move_call(
        &format!("{PACKAGE_ID}::balance_manager::generate_proof_as_owner"),
        &[],
        vec![manager],
    )?;

    let pool = tx.object(&strategy.venue.pool_id);
    let client_order_id = tx.pure_u64(ARB_CLIENT_ORDER_ID);
    let self_matching = tx.pure_u8(SELF_MATCHING_ALLOWED);
    let quantity = tx.pure_u64(quantity);
    let is_bid = tx.pure_bool(side.is_bid());
    let pay_with_deep = tx.pure_bool(strategy.pay_with_deep);
    let clock = tx.object(CLOCK_OBJECT_ID);
    tx.move_call(
        &format!("{PACKAGE_ID}::pool::place_market_order"),
        &[strategy.base.coin_type.as_str(), strategy.quote.coin_type.as_str()],
        vec![
            pool,
            manager,
            proof,
            client_order_id,
            self_matching,
            quantity,
            is_bid,
            pay_with_deep,
            clock,
        ],
    )?;

    let proceeds = tx.move_call(
        &format!("{PACKAGE_ID}::balance_manager::withdraw_all"),
        &[withdraw.coin_type.as_str()],
        vec![manager],
    )?;
    tx.transfer_objects(vec![proceeds], &strategy.wallet_address)?;
    tx.set_gas_budget(GAS_BUDGET);
    Ok(tx)
}
