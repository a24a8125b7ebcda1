use super::events::{swap_output, withdrawal_amount};
use super::transactions::deposit_and_trade;
use super::{CycleFailure, CycleOutcome, SettlementReport, WorkflowState};
use crate::arbitrage::{best_prices, detect};
use crate::chain::{BalanceReader, OrderBook, SwapRouter, Transaction, TransactionExecutor, TransactionOutcome};
use crate::config::StrategyConfig;
use crate::deepbook::GAS_BUDGET;
use crate::deepbook::scale::{format_decimal, from_native, native_to_ui, round_to_lot, to_native_units};
use crate::errors::{AppError, Result};
use crate::markets::AssetConfig;
use crate::models::{Balances, TradeSide};
use crate::oracle::PriceOracle;
use bigdecimal::BigDecimal;
use num_traits::Zero;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Execution {
    swap: Arc<dyn SwapRouter>,
    executor: Arc<dyn TransactionExecutor>,
}

/// Runs detection and settlement cycles for one strategy.
pub struct Orchestrator {
    strategy: StrategyConfig,
    oracle: Arc<dyn PriceOracle>,
    book: Arc<dyn OrderBook>,
    wallet: Arc<dyn BalanceReader>,
    execution: Option<Execution>,
}

/// Mutable progress of the cycle in flight.
struct CycleRun {
    state: WorkflowState,
    submitted: Vec<String>,
}

impl CycleRun {
    fn enter(&mut self, next: WorkflowState) {
        debug!(from = %self.state, to = %next, "[SETTLE] transition");
        self.state = next;
    }
}

impl Orchestrator {
    /// Monitor-only orchestrator: detects and checks funding, never trades.
    pub fn new(
        strategy: StrategyConfig,
        oracle: Arc<dyn PriceOracle>,
        book: Arc<dyn OrderBook>,
        wallet: Arc<dyn BalanceReader>,
    ) -> Self {
        Self { strategy, oracle, book, wallet, execution: None }
    }

    /// Attach the ports needed to settle opportunities on chain.
    pub fn with_execution(
        mut self,
        swap: Arc<dyn SwapRouter>,
        executor: Arc<dyn TransactionExecutor>,
    ) -> Self {
        self.execution = Some(Execution { swap, executor });
        self
    }

    pub fn strategy(&self) -> &StrategyConfig {
        &self.strategy
    }

    pub async fn run_cycle(&self) -> std::result::Result<CycleOutcome, CycleFailure> {
        let mut run = CycleRun { state: WorkflowState::Start, submitted: Vec::new() };
        match self.cycle(&mut run).await {
            Ok(outcome) => Ok(outcome),
            Err(source) => {
                warn!(state = %run.state, submitted = ?run.submitted, error = %source, "[SETTLE] aborted");
                Err(CycleFailure { state: run.state, submitted: run.submitted, source })
            }
        }
    }

    async fn cycle(&self, run: &mut CycleRun) -> Result<CycleOutcome> {
        let s = &self.strategy;

        let oracle_price = self.oracle.price(s.base.price_id()?).await?;
        info!(symbol = %s.base.symbol, price = %format_decimal(&oracle_price), "[ORACLE] price");

        let orders = self.book.open_orders(&s.venue.pool_id, &s.base, &s.quote).await?;
        let (best_bid, best_ask) = best_prices(&orders);
        let (best_bid, best_ask) = (best_bid.cloned(), best_ask.cloned());
        info!(
            pool = %s.venue.name,
            orders = orders.len(),
            best_bid = %best_bid.as_ref().map(format_decimal).unwrap_or_else(|| "-".into()),
            best_ask = %best_ask.as_ref().map(format_decimal).unwrap_or_else(|| "-".into()),
            "[BOOK] snapshot"
        );

        let Some(opportunity) = detect(&oracle_price, &orders, &s.arbitrage_slippage) else {
            let one = BigDecimal::from(1);
            let upper = &oracle_price * (&one + &s.arbitrage_slippage);
            let lower = &oracle_price * (&one - &s.arbitrage_slippage);
            info!(
                lower = %format_decimal(&lower),
                upper = %format_decimal(&upper),
                "[CYCLE] no arbitrage opportunity"
            );
            return Ok(CycleOutcome::NoOpportunity { best_bid, best_ask, lower, upper });
        };

        let fill = opportunity.size();
        let side = opportunity.side;
        info!(
            %side,
            orders = opportunity.orders.len(),
            lower = %format_decimal(&opportunity.lower),
            upper = %format_decimal(&opportunity.upper),
            base_quantity = %format_decimal(&fill.base_quantity),
            quote_quantity = %format_decimal(&fill.quote_quantity),
            estimated_profit = %format_decimal(&fill.estimated_profit),
            "[CYCLE] arbitrage opportunity found"
        );

        let order_quantity = round_to_lot(&fill.base_quantity, &s.venue.lot_size);
        if order_quantity.is_zero() || order_quantity < s.venue.min_size {
            info!(
                quantity = %format_decimal(&order_quantity),
                min_size = %format_decimal(&s.venue.min_size),
                "[CYCLE] below venue minimum size"
            );
            return Ok(CycleOutcome::BelowMinimumSize {
                quantity: order_quantity,
                min_size: s.venue.min_size.clone(),
            });
        }

        run.enter(WorkflowState::BalanceCheck);
        let balances = self.wallet.balances(&s.wallet_address).await?;
        let base_balance = ui_balance(&balances, &s.base);
        let quote_balance = ui_balance(&balances, &s.quote);
        let fee_factor = s.fee_factor();
        info!(
            base = %format_decimal(&base_balance),
            quote = %format_decimal(&quote_balance),
            "[SETTLE] wallet balances"
        );

        // Quote actually spent by the lot-rounded order.
        let order_quote = opportunity.quote_for_quantity(&order_quantity);
        let needs_pre_swap = match side {
            TradeSide::Buy => {
                let required = &order_quote * &fee_factor;
                if quote_balance < required {
                    return Ok(self.insufficient(run, &s.quote, required, quote_balance));
                }
                false
            }
            TradeSide::Sell => {
                let required = &order_quantity * &fee_factor;
                if base_balance >= required {
                    false
                } else if quote_balance >= fill.quote_quantity {
                    true
                } else {
                    return Ok(self.insufficient(run, &s.base, required, base_balance));
                }
            }
        };

        let Some(execution) = &self.execution else {
            info!(%side, "[CYCLE] monitor mode, not settling");
            return Ok(CycleOutcome::Simulated { opportunity, fill });
        };

        let mut base_available = base_balance;
        let mut pre_swap_out = None;
        if needs_pre_swap {
            run.enter(WorkflowState::PreSwap);
            let out = self
                .swap(run, execution, &s.quote, &s.base, &fill.quote_quantity)
                .await?;
            base_available += &out;
            pre_swap_out = Some(out);
        }

        run.enter(WorkflowState::DepositAndTrade);
        let (deposit_asset, withdraw_asset, trade_quantity, deposited) = match side {
            TradeSide::Buy => (&s.quote, &s.base, order_quantity.clone(), &order_quote * &fee_factor),
            TradeSide::Sell => {
                let lots_on_hand = round_to_lot(&base_available, &s.venue.lot_size);
                let quantity = order_quantity.clone().min(lots_on_hand);
                if quantity.is_zero() || quantity < s.venue.min_size {
                    return Err(AppError::SwapShortfall(format!(
                        "{} {} on hand, venue minimum {}",
                        format_decimal(&base_available),
                        s.base.symbol,
                        format_decimal(&s.venue.min_size)
                    )));
                }
                let deposit = (&quantity * &fee_factor).min(base_available.clone());
                (&s.base, &s.quote, quantity, deposit)
            }
        };
        info!(
            %side,
            deposit = %format_decimal(&deposited),
            deposit_asset = %deposit_asset.symbol,
            quantity = %format_decimal(&trade_quantity),
            "[SETTLE] deposit and trade"
        );
        let tx = deposit_and_trade(
            s,
            side,
            deposit_asset,
            to_native_units(&deposited, deposit_asset.decimals)?,
            withdraw_asset,
            to_native_units(&trade_quantity, s.base.decimals)?,
        )?;
        let outcome = self.submit(run, execution, tx).await?;

        run.enter(WorkflowState::WithdrawCheck);
        let withdrawn = withdrawal_amount(&outcome, withdraw_asset.decimals)?;
        info!(
            amount = %format_decimal(&withdrawn),
            asset = %withdraw_asset.symbol,
            "[SETTLE] withdrawn to wallet"
        );

        let mut post_swap_out = None;
        if side == TradeSide::Buy {
            run.enter(WorkflowState::PostSwap);
            let balances = self.wallet.balances(&s.wallet_address).await?;
            let residual = ui_balance(&balances, &s.base);
            if residual.is_zero() {
                info!("[SETTLE] no residual base to swap");
            } else {
                let out = self.swap(run, execution, &s.base, &s.quote, &residual).await?;
                post_swap_out = Some(out);
            }
        }

        run.enter(WorkflowState::Done);
        let report = SettlementReport {
            side,
            fill,
            order_quantity: trade_quantity,
            deposited,
            withdrawn,
            pre_swap_out,
            post_swap_out,
            digests: run.submitted.clone(),
        };
        info!(digests = ?report.digests, "[SETTLE] cycle complete");
        Ok(CycleOutcome::Completed(report))
    }

    fn insufficient(
        &self,
        run: &mut CycleRun,
        asset: &AssetConfig,
        required: BigDecimal,
        available: BigDecimal,
    ) -> CycleOutcome {
        run.enter(WorkflowState::Aborted);
        info!(
            asset = %asset.symbol,
            required = %format_decimal(&required),
            available = %format_decimal(&available),
            "[SETTLE] insufficient funds"
        );
        CycleOutcome::InsufficientFunds { asset: asset.symbol.clone(), required, available }
    }

    /// Swap `amount` of `from` into `to` through the aggregator and return
    /// the realised output.
    async fn swap(
        &self,
        run: &mut CycleRun,
        execution: &Execution,
        from: &AssetConfig,
        to: &AssetConfig,
        amount: &BigDecimal,
    ) -> Result<BigDecimal> {
        let s = &self.strategy;
        let amount_in = to_native_units(amount, from.decimals)?;
        let quote = execution.swap.quote(&from.coin_type, &to.coin_type, amount_in).await?;
        info!(
            from = %from.symbol,
            to = %to.symbol,
            amount_in = %format_decimal(amount),
            estimated_out = %format_decimal(&native_to_ui(&from_native(quote.estimated_amount_out), to.decimals)),
            "[SETTLE] swap quote"
        );

        let mut tx = Transaction::new();
        let coin_in = tx.coin_with_balance(&from.coin_type, amount_in);
        let coin_out = execution
            .swap
            .build_swap(&quote, &s.wallet_address, &s.swap_slippage, &mut tx, coin_in)
            .await?;
        tx.transfer_objects(vec![coin_out], &s.wallet_address)?;
        tx.set_gas_budget(GAS_BUDGET);

        let outcome = self.submit(run, execution, tx).await?;
        let out = swap_output(&outcome, to.decimals)?;
        info!(amount_out = %format_decimal(&out), asset = %to.symbol, "[SETTLE] swap settled");
        Ok(out)
    }

    async fn submit(
        &self,
        run: &mut CycleRun,
        execution: &Execution,
        tx: Transaction,
    ) -> Result<TransactionOutcome> {
        let outcome = execution.executor.execute(tx).await?.ensure_success()?;
        info!(digest = %outcome.digest, state = %run.state, "[SETTLE] transaction executed");
        run.submitted.push(outcome.digest.clone());
        Ok(outcome)
    }
}

fn ui_balance(balances: &Balances, asset: &AssetConfig) -> BigDecimal {
    let native = balances.get(&asset.coin_type).copied().unwrap_or_default();
    native_to_ui(&from_native(native), asset.decimals)
}
