//! Settlement of a detected opportunity against the venue.
//!
//! Responsibilities:
//! • Run one detection cycle: oracle price, order book, detector, sizing.
//! • Walk the settlement state machine and report how far it got.
//! • Keep failures after a submitted transaction distinguishable from
//!   clean non-trading outcomes.

use crate::arbitrage::{ArbitrageOpportunity, FillEstimate};
use crate::errors::AppError;
use crate::models::TradeSide;
use bigdecimal::BigDecimal;
use std::fmt;
use thiserror::Error;

pub mod events;
pub mod transactions;
pub mod workflow;

pub use workflow::Orchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    BalanceCheck,
    PreSwap,
    DepositAndTrade,
    WithdrawCheck,
    PostSwap,
    Done,
    Aborted,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Start => "START",
            WorkflowState::BalanceCheck => "BALANCE_CHECK",
            WorkflowState::PreSwap => "PRE_SWAP",
            WorkflowState::DepositAndTrade => "DEPOSIT_AND_TRADE",
            WorkflowState::WithdrawCheck => "WITHDRAW_CHECK",
            WorkflowState::PostSwap => "POST_SWAP",
            WorkflowState::Done => "DONE",
            WorkflowState::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// What a completed settlement did, in UI units.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementReport {
    pub side: TradeSide,
    pub fill: FillEstimate,
    /// Base quantity of the market order after lot rounding.
    pub order_quantity: BigDecimal,
    pub deposited: BigDecimal,
    pub withdrawn: BigDecimal,
    pub pre_swap_out: Option<BigDecimal>,
    pub post_swap_out: Option<BigDecimal>,
    /// Digests of every executed transaction, in submission order.
    pub digests: Vec<String>,
}

/// Non-error end of a cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    NoOpportunity {
        best_bid: Option<BigDecimal>,
        best_ask: Option<BigDecimal>,
        lower: BigDecimal,
        upper: BigDecimal,
    },
    InsufficientFunds {
        asset: String,
        required: BigDecimal,
        available: BigDecimal,
    },
    BelowMinimumSize {
        quantity: BigDecimal,
        min_size: BigDecimal,
    },
    /// Funded opportunity found with no execution ports attached.
    Simulated {
        opportunity: ArbitrageOpportunity,
        fill: FillEstimate,
    },
    Completed(SettlementReport),
}

/// A cycle that stopped on an error.
#[derive(Debug, Error)]
#[error("cycle aborted in {state}: {source}")]
pub struct CycleFailure {
    /// State the workflow was in when the error surfaced.
    pub state: WorkflowState,
    /// Transactions that executed successfully before the failure.
    /// Nothing is rolled back.
    pub submitted: Vec<String>,
    #[source]
    pub source: AppError,
}

impl CycleFailure {
    /// True when funds already moved on chain.
    pub fn is_partial(&self) -> bool {
        !self.submitted.is_empty()
    }
}
