//! Chain-facing ports and the transaction receipts they return.
//!
//! The settlement workflow only talks to the chain and the swap aggregator
//! through these traits, so any transport (a signing full-node client, a
//! relayer, a test double) can sit behind them.

use crate::errors::{AppError, Result};
use crate::markets::AssetConfig;
use crate::models::{Balances, ScaledOrder};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde_json::Value;

pub mod sui;
pub mod transaction;

pub use sui::SuiRpcClient;
pub use transaction::{Argument, Transaction};

/// Resting orders of one pool, already scaled to UI units.
#[async_trait]
pub trait OrderBook: Send + Sync {
    async fn open_orders(
        &self,
        pool_id: &str,
        base: &AssetConfig,
        quote: &AssetConfig,
    ) -> Result<Vec<ScaledOrder>>;
}

#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn balances(&self, owner: &str) -> Result<Balances>;
}

/// Opaque quote handle from a swap aggregator.
#[derive(Debug, Clone)]
pub struct SwapQuote {
    pub token_in: String,
    pub token_out: String,
    /// Native units of `token_in`.
    pub amount_in: u64,
    /// Native units of `token_out` the aggregator expects to return.
    pub estimated_amount_out: u128,
    /// Route data the aggregator needs to build the swap.
    pub route: Value,
}

#[async_trait]
pub trait SwapRouter: Send + Sync {
    async fn quote(&self, token_in: &str, token_out: &str, amount_in: u64) -> Result<SwapQuote>;

    /// Append the swap to `tx`, consuming `coin_in`; returns the output coin.
    async fn build_swap(
        &self,
        quote: &SwapQuote,
        account: &str,
        slippage: &BigDecimal,
        tx: &mut Transaction,
        coin_in: Argument,
    ) -> Result<Argument>;
}

/// Signs and submits transactions for the trading wallet.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    async fn execute(&self, tx: Transaction) -> Result<TransactionOutcome>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainEvent {
    pub event_type: String,
    pub parsed_json: Value,
}

impl ChainEvent {
    /// Integer field that the chain may render as a JSON string or number.
    pub fn u128_field(&self, field: &str) -> Result<u128> {
        match self.parsed_json.get(field) {
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| AppError::Parse(format!("{}.{field}: {s:?}", self.event_type))),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(u128::from)
                .ok_or_else(|| AppError::Parse(format!("{}.{field}: {n}", self.event_type))),
            _ => Err(AppError::EventNotFound(format!(
                "{} has no field {field}",
                self.event_type
            ))),
        }
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.parsed_json.get(field).and_then(Value::as_bool)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure(String),
}

/// Receipt of an executed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    pub digest: String,
    pub status: ExecutionStatus,
    pub events: Vec<ChainEvent>,
}

impl TransactionOutcome {
    /// Turn a failed execution into [`AppError::TransactionRejected`].
    pub fn ensure_success(self) -> Result<Self> {
        match &self.status {
            ExecutionStatus::Success => Ok(self),
            ExecutionStatus::Failure(reason) => Err(AppError::TransactionRejected {
                digest: self.digest.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn find_event(&self, type_suffix: &str, pred: impl Fn(&ChainEvent) -> bool) -> Option<&ChainEvent> {
        self.events
            .iter()
            .find(|e| e.event_type.ends_with(type_suffix) && pred(e))
    }
}
