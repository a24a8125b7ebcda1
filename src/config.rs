//! Configuration loader and application settings.

use crate::deepbook::scale::parse_decimal;
use crate::errors::{AppError, Result};
use crate::markets::{AssetConfig, Markets, VenueConfig};
use crate::oracle::pyth::HERMES_ENDPOINT;
use bigdecimal::BigDecimal;
use num_traits::{One, Zero};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sui full-node JSON-RPC endpoint.
    pub sui_rpc_url: Url,
    /// Pyth Hermes endpoint.
    pub pyth_endpoint_url: Url,
    /// Trading wallet.
    pub wallet_address: String,
    /// DeepBook balance manager owned by the wallet.
    pub balance_manager_id: String,
    /// Venue entry in the market tables (e.g. "SUI_USDC").
    pub pool_name: String,
    /// Fractional band around the oracle price, e.g. 0.01.
    pub arbitrage_slippage: BigDecimal,
    /// Slippage tolerated by the swap aggregator.
    pub swap_slippage: BigDecimal,
    /// Delay between the end of one cycle and the start of the next.
    pub interval: Duration,
    pub pay_with_deep: bool,
    /// Market tables; the embedded defaults when unset.
    pub markets_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("Set {key} env var")))
        };
        let url = |key: &str, value: String| {
            Url::parse(&value).map_err(|e| AppError::Config(format!("{key}: {e}")))
        };

        let sui_rpc_url = url("SUI_RPC_URL", required("SUI_RPC_URL")?)?;
        let pyth_endpoint_url = url(
            "PYTH_ENDPOINT_URL",
            get("PYTH_ENDPOINT_URL").unwrap_or_else(|| HERMES_ENDPOINT.into()),
        )?;

        let arbitrage_slippage = slippage("ARBITRAGE_SLIPPAGE", get("ARBITRAGE_SLIPPAGE"))?;
        let swap_slippage = slippage("SWAP_SLIPPAGE", get("SWAP_SLIPPAGE"))?;

        let interval_ms: u64 = get("ARBITRAGE_INTERVAL_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .map_err(|_| AppError::Config("ARBITRAGE_INTERVAL_MS must be an integer".into()))?;

        let pay_with_deep = match get("PAY_WITH_DEEP").as_deref() {
            None | Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            Some(other) => {
                return Err(AppError::Config(format!("PAY_WITH_DEEP: {other:?}")));
            }
        };

        Ok(Self {
            sui_rpc_url,
            pyth_endpoint_url,
            wallet_address: required("WALLET_ADDRESS")?,
            balance_manager_id: required("BALANCE_MANAGER_ID")?,
            pool_name: required("POOL_NAME")?,
            arbitrage_slippage,
            swap_slippage,
            interval: Duration::from_millis(interval_ms),
            pay_with_deep,
            markets_file: get("MARKETS_FILE").map(PathBuf::from),
        })
    }

    pub fn markets(&self) -> Result<Markets> {
        match &self.markets_file {
            Some(path) => Markets::from_file(path),
            None => Markets::embedded(),
        }
    }
}

fn slippage(key: &str, raw: Option<String>) -> Result<BigDecimal> {
    let value = parse_decimal(raw.as_deref().unwrap_or("0.01"))
        .map_err(|e| AppError::Config(format!("{key}: {e}")))?;
    if value < BigDecimal::zero() || value >= BigDecimal::one() {
        return Err(AppError::Config(format!("{key} must be in [0, 1)")));
    }
    Ok(value)
}

/// Everything one strategy instance needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub venue: VenueConfig,
    pub base: AssetConfig,
    pub quote: AssetConfig,
    pub wallet_address: String,
    pub balance_manager_id: String,
    pub arbitrage_slippage: BigDecimal,
    pub swap_slippage: BigDecimal,
    pub pay_with_deep: bool,
}

impl StrategyConfig {
    pub fn resolve(config: &AppConfig, markets: &Markets) -> Result<Self> {
        let venue = markets.venue(&config.pool_name)?.clone();
        let base = markets.asset(&venue.base_symbol)?.clone();
        let quote = markets.asset(&venue.quote_symbol)?.clone();
        // The oracle prices the base asset; without a feed the strategy cannot run.
        base.price_id()?;
        Ok(Self {
            venue,
            base,
            quote,
            wallet_address: config.wallet_address.clone(),
            balance_manager_id: config.balance_manager_id.clone(),
            arbitrage_slippage: config.arbitrage_slippage.clone(),
            swap_slippage: config.swap_slippage.clone(),
            pay_with_deep: config.pay_with_deep,
        })
    }

    /// Multiplier on deposits covering the taker fee when it is charged in
    /// the traded asset instead of DEEP.
    pub fn fee_factor(&self) -> BigDecimal {
        if self.pay_with_deep {
            BigDecimal::one()
        } else {
            BigDecimal::one() + BigDecimal::new(self.venue.taker_fee_bps.into(), 4)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("SUI_RPC_URL", "https://fullnode.mainnet.sui.io:443"),
        ("WALLET_ADDRESS", "0xabc"),
        ("BALANCE_MANAGER_ID", "0xdef"),
        ("POOL_NAME", "DORI_USDC"),
    ];

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(env(BASE)).unwrap();
        assert_eq!(config.pyth_endpoint_url.as_str(), "https://hermes.pyth.network/");
        assert_eq!(config.arbitrage_slippage, parse_decimal("0.01").unwrap());
        assert_eq!(config.interval, Duration::from_secs(30));
        assert!(config.pay_with_deep);
        assert!(config.markets_file.is_none());
    }

    #[test]
    fn missing_required_is_config_error() {
        let err = AppConfig::from_lookup(env(&BASE[1..])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("SUI_RPC_URL")));
    }

    #[test]
    fn malformed_values_rejected() {
        for (key, value) in [
            ("ARBITRAGE_SLIPPAGE", "abc"),
            ("ARBITRAGE_SLIPPAGE", "1.5"),
            ("SWAP_SLIPPAGE", "-0.1"),
            ("ARBITRAGE_INTERVAL_MS", "soon"),
            ("PAY_WITH_DEEP", "maybe"),
            ("SUI_RPC_URL", "not a url"),
        ] {
            let mut pairs = BASE.to_vec();
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));
            assert!(
                matches!(AppConfig::from_lookup(env(&pairs)), Err(AppError::Config(_))),
                "{key}={value}"
            );
        }
    }

    #[test]
    fn strategy_needs_oracle_for_base() {
        let config = AppConfig::from_lookup(env(BASE)).unwrap();
        let markets = Markets::embedded().unwrap();
        // DORI has no price feed in the shipped tables
        assert!(matches!(
            StrategyConfig::resolve(&config, &markets),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn shipped_sui_pool_resolves() {
        let mut pairs = BASE.to_vec();
        pairs.retain(|(k, _)| *k != "POOL_NAME");
        pairs.push(("POOL_NAME", "SUI_USDC"));
        let config = AppConfig::from_lookup(env(&pairs)).unwrap();
        let strategy = StrategyConfig::resolve(&config, &Markets::embedded().unwrap()).unwrap();
        assert_eq!(strategy.base.symbol, "SUI");
        assert_eq!(strategy.quote.symbol, "USDC");
    }

    #[test]
    fn fee_factor_only_without_deep() {
        let markets = Markets::from_toml(
            r#"
            [[assets]]
            symbol = "SUI"
            coin_type = "0x2::sui::SUI"
            decimals = 9
            pyth_price_id = "0x23"
            [[assets]]
            symbol = "USDC"
            coin_type = "0x5::usdc::USDC"
            decimals = 6
            [[venues]]
            name = "SUI_USDC"
            pool_id = "0x9"
            base_symbol = "SUI"
            quote_symbol = "USDC"
            tick_size = "0.001"
            lot_size = "0.1"
            min_size = "1"
            taker_fee_bps = 10
            maker_fee_bps = 5
        "#,
        )
        .unwrap();
        let mut pairs = BASE.to_vec();
        pairs.retain(|(k, _)| *k != "POOL_NAME");
        pairs.push(("POOL_NAME", "SUI_USDC"));
        pairs.push(("PAY_WITH_DEEP", "false"));
        let config = AppConfig::from_lookup(env(&pairs)).unwrap();
        let strategy = StrategyConfig::resolve(&config, &markets).unwrap();
        assert_eq!(strategy.fee_factor(), parse_decimal("1.001").unwrap());
    }
}
