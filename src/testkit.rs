//! In-memory doubles for the chain and oracle ports.
//!
//! Each fake records what it was asked so tests can assert on the calls
//! the orchestrator made, not only on the outcome.

use crate::chain::{
    Argument, BalanceReader, ChainEvent, ExecutionStatus, OrderBook, SwapQuote, SwapRouter,
    Transaction, TransactionExecutor, TransactionOutcome,
};
use crate::config::StrategyConfig;
use crate::deepbook::scale::parse_decimal;
use crate::errors::{AppError, Result};
use crate::markets::{AssetConfig, VenueConfig};
use crate::models::{Balances, ScaledOrder};
use crate::oracle::PriceOracle;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const BASE_TYPE: &str = "0x2::sui::SUI";
pub const QUOTE_TYPE: &str = "0xdba3::usdc::USDC";
pub const WALLET: &str = "0xa11ce";

/// SUI/USDC strategy with a 0.01 lot and a 1% band.
pub fn strategy() -> StrategyConfig {
    StrategyConfig {
        venue: VenueConfig {
            name: "SUI_USDC".into(),
            pool_id: "0x9001".into(),
            base_symbol: "SUI".into(),
            quote_symbol: "USDC".into(),
            tick_size: parse_decimal("0.001").unwrap(),
            lot_size: parse_decimal("0.01").unwrap(),
            min_size: parse_decimal("0.1").unwrap(),
            taker_fee_bps: 10,
            maker_fee_bps: 5,
        },
        base: AssetConfig {
            symbol: "SUI".into(),
            coin_type: BASE_TYPE.into(),
            decimals: 9,
            pyth_price_id: Some("0x23d7".into()),
        },
        quote: AssetConfig {
            symbol: "USDC".into(),
            coin_type: QUOTE_TYPE.into(),
            decimals: 6,
            pyth_price_id: None,
        },
        wallet_address: WALLET.into(),
        balance_manager_id: "0xb0b".into(),
        arbitrage_slippage: parse_decimal("0.01").unwrap(),
        swap_slippage: parse_decimal("0.01").unwrap(),
        pay_with_deep: true,
    }
}

pub fn balances(base: u128, quote: u128) -> Balances {
    [(BASE_TYPE.to_string(), base), (QUOTE_TYPE.to_string(), quote)]
        .into_iter()
        .collect()
}

pub struct FakeOracle {
    price: Option<BigDecimal>,
    pub calls: AtomicUsize,
}

impl FakeOracle {
    pub fn priced(price: &str) -> Self {
        Self { price: Some(parse_decimal(price).unwrap()), calls: AtomicUsize::new(0) }
    }

    pub fn unavailable() -> Self {
        Self { price: None, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl PriceOracle for FakeOracle {
    async fn price(&self, price_id: &str) -> Result<BigDecimal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.price
            .clone()
            .ok_or_else(|| AppError::OracleUnavailable(format!("{price_id}: offline")))
    }
}

pub struct FakeBook(pub Vec<ScaledOrder>);

#[async_trait]
impl OrderBook for FakeBook {
    async fn open_orders(&self, _: &str, _: &AssetConfig, _: &AssetConfig) -> Result<Vec<ScaledOrder>> {
        Ok(self.0.clone())
    }
}

/// Returns the queued snapshots in order, repeating the last one.
pub struct FakeWallet(Mutex<VecDeque<Balances>>);

impl FakeWallet {
    pub fn new(snapshots: Vec<Balances>) -> Self {
        Self(Mutex::new(snapshots.into()))
    }
}

#[async_trait]
impl BalanceReader for FakeWallet {
    async fn balances(&self, _: &str) -> Result<Balances> {
        let mut queue = self.0.lock().unwrap();
        if queue.len() > 1 {
            return Ok(queue.pop_front().unwrap());
        }
        Ok(queue.front().cloned().unwrap_or_default())
    }
}

/// Quotes at a fixed output and appends a single router call per swap.
pub struct FakeSwap {
    amount_out: u128,
    pub quotes: Mutex<Vec<(String, String, u64)>>,
}

impl FakeSwap {
    pub fn returning(amount_out: u128) -> Self {
        Self { amount_out, quotes: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl SwapRouter for FakeSwap {
    async fn quote(&self, token_in: &str, token_out: &str, amount_in: u64) -> Result<SwapQuote> {
        self.quotes
            .lock()
            .unwrap()
            .push((token_in.into(), token_out.into(), amount_in));
        Ok(SwapQuote {
            token_in: token_in.into(),
            token_out: token_out.into(),
            amount_in,
            estimated_amount_out: self.amount_out,
            route: json!({"hops": 1}),
        })
    }

    async fn build_swap(
        &self,
        quote: &SwapQuote,
        _account: &str,
        _slippage: &BigDecimal,
        tx: &mut Transaction,
        coin_in: Argument,
    ) -> Result<Argument> {
        tx.move_call(
            "0x7::router::swap",
            &[quote.token_in.as_str(), quote.token_out.as_str()],
            vec![coin_in],
        )
    }
}

/// Plays back scripted receipts and keeps every submitted transaction.
pub struct FakeExecutor {
    receipts: Mutex<VecDeque<TransactionOutcome>>,
    pub submitted: Mutex<Vec<Transaction>>,
}

impl FakeExecutor {
    pub fn scripted(receipts: Vec<TransactionOutcome>) -> Self {
        Self { receipts: Mutex::new(receipts.into()), submitted: Mutex::new(Vec::new()) }
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

#[async_trait]
impl TransactionExecutor for FakeExecutor {
    async fn execute(&self, tx: Transaction) -> Result<TransactionOutcome> {
        self.submitted.lock().unwrap().push(tx);
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::ChainQuery("no scripted receipt".into()))
    }
}

pub fn receipt(digest: &str, events: Vec<ChainEvent>) -> TransactionOutcome {
    TransactionOutcome { digest: digest.into(), status: ExecutionStatus::Success, events }
}

pub fn rejected(digest: &str, reason: &str) -> TransactionOutcome {
    TransactionOutcome {
        digest: digest.into(),
        status: ExecutionStatus::Failure(reason.into()),
        events: vec![],
    }
}

pub fn balance_event(amount: u128, deposit: bool) -> ChainEvent {
    ChainEvent {
        event_type: "0xdee9::balance_manager::BalanceEvent".into(),
        parsed_json: json!({"balance_manager_id": "0xb0b", "amount": amount.to_string(), "deposit": deposit}),
    }
}

pub fn swap_event(amount_out: u128) -> ChainEvent {
    ChainEvent {
        event_type: "0x7::settle::Swap".into(),
        parsed_json: json!({"amount_in": "1", "amount_out": Value::String(amount_out.to_string())}),
    }
}
