//! Fixed-delay loop driving settlement cycles.

use crate::deepbook::scale::format_decimal;
use crate::settlement::{CycleFailure, CycleOutcome, Orchestrator};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Run cycles back to back, sleeping `interval` after each one, until
/// `shutdown` resolves. Cycle errors and panics are logged and never end
/// the loop.
pub async fn run_until<F>(orchestrator: Arc<Orchestrator>, interval: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut cycles: u64 = 0;
    info!(
        pool = %orchestrator.strategy().venue.name,
        interval_ms = interval.as_millis() as u64,
        "[INIT] arbitrage loop started"
    );

    loop {
        cycles += 1;
        let task = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.run_cycle().await }
        });
        match task.await {
            Ok(result) => report(cycles, result),
            Err(e) => error!(cycle = cycles, error = %e, "[CYCLE] cycle task panicked"),
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut shutdown => {
                info!(cycles, "[SHUTDOWN] stopping arbitrage loop");
                return cycles;
            }
        }
    }
}

fn report(cycle: u64, result: Result<CycleOutcome, CycleFailure>) {
    match result {
        Ok(CycleOutcome::NoOpportunity { .. }) => {
            info!(cycle, "[CYCLE] done, nothing to trade");
        }
        Ok(CycleOutcome::InsufficientFunds { asset, required, available }) => {
            warn!(
                cycle,
                %asset,
                required = %format_decimal(&required),
                available = %format_decimal(&available),
                "[CYCLE] skipped, insufficient funds"
            );
        }
        Ok(CycleOutcome::BelowMinimumSize { quantity, .. }) => {
            info!(cycle, quantity = %format_decimal(&quantity), "[CYCLE] skipped, below minimum size");
        }
        Ok(CycleOutcome::Simulated { opportunity, fill }) => {
            info!(
                cycle,
                side = %opportunity.side,
                estimated_profit = %format_decimal(&fill.estimated_profit),
                "[CYCLE] opportunity detected (monitor mode)"
            );
        }
        Ok(CycleOutcome::Completed(settlement)) => {
            info!(
                cycle,
                side = %settlement.side,
                withdrawn = %format_decimal(&settlement.withdrawn),
                digests = ?settlement.digests,
                "[CYCLE] settled"
            );
        }
        Err(failure) if failure.is_partial() => {
            error!(
                cycle,
                state = %failure.state,
                submitted = ?failure.submitted,
                error = %failure.source,
                "[CYCLE] failed after submitting transactions"
            );
        }
        Err(failure) => {
            warn!(cycle, state = %failure.state, error = %failure.source, "[CYCLE] failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::OrderBook;
    use crate::errors::Result;
    use crate::markets::AssetConfig;
    use crate::models::ScaledOrder;
    use crate::testkit::{FakeBook, FakeOracle, FakeWallet, strategy};
    use async_trait::async_trait;
    use std::sync::atomic::Ordering;

    struct PanickingBook;

    #[async_trait]
    impl OrderBook for PanickingBook {
        async fn open_orders(&self, _: &str, _: &AssetConfig, _: &AssetConfig) -> Result<Vec<ScaledOrder>> {
            panic!("book exploded");
        }
    }

    #[tokio::test]
    async fn keeps_cycling_through_errors() {
        let oracle = Arc::new(FakeOracle::unavailable());
        let orchestrator = Arc::new(Orchestrator::new(
            strategy(),
            oracle.clone(),
            Arc::new(FakeBook(vec![])),
            Arc::new(FakeWallet::new(vec![])),
        ));
        let cycles = run_until(
            orchestrator,
            Duration::from_millis(5),
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await;
        assert!(cycles >= 2);
        assert_eq!(oracle.calls.load(Ordering::SeqCst) as u64, cycles);
    }

    #[tokio::test]
    async fn survives_panicking_cycle() {
        let orchestrator = Arc::new(Orchestrator::new(
            strategy(),
            Arc::new(FakeOracle::priced("100")),
            Arc::new(PanickingBook),
            Arc::new(FakeWallet::new(vec![])),
        ));
        let cycles = run_until(
            orchestrator,
            Duration::from_millis(5),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;
        assert!(cycles >= 2);
    }

    #[tokio::test]
    async fn shutdown_is_checked_after_each_cycle() {
        let orchestrator = Arc::new(Orchestrator::new(
            strategy(),
            Arc::new(FakeOracle::priced("100")),
            Arc::new(FakeBook(vec![])),
            Arc::new(FakeWallet::new(vec![])),
        ));
        let cycles = run_until(orchestrator, Duration::from_secs(3600), async {}).await;
        assert_eq!(cycles, 1);
    }
}
