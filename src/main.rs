use anyhow::Result;
use oracle_book_arb::{
    chain::SuiRpcClient,
    config::{AppConfig, StrategyConfig},
    deepbook::scale::format_decimal,
    oracle::HermesClient,
    runner,
    settlement::Orchestrator,
    utils,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    let markets = config.markets()?;
    let strategy = StrategyConfig::resolve(&config, &markets)?;

    tracing::info!(
        pool = %strategy.venue.name,
        base = %strategy.base.symbol,
        quote = %strategy.quote.symbol,
        arbitrage_slippage = %format_decimal(&strategy.arbitrage_slippage),
        interval_ms = config.interval.as_millis() as u64,
        "[INIT] oracle-book-arb starting"
    );

    let oracle = Arc::new(HermesClient::new(config.pyth_endpoint_url.clone())?);
    let sui = Arc::new(SuiRpcClient::new(config.sui_rpc_url.clone())?);

    // No signer is wired in, so the binary only detects and checks funding.
    let orchestrator = Arc::new(Orchestrator::new(strategy, oracle, sui.clone(), sui));

    runner::run_until(orchestrator, config.interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "[SHUTDOWN] failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await;
    Ok(())
}
