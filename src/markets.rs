//! Static asset and venue tables.
//!
//! Tables are parsed once at startup from TOML (the embedded
//! `config/markets.toml` unless a file is supplied) and are read-only
//! afterwards. Lookups fail with [`AppError::Config`].

use crate::deepbook::scale::parse_decimal;
use crate::errors::{AppError, Result};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_MARKETS: &str = include_str!("../config/markets.toml");

/// A coin the agent knows how to price and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub symbol: String,
    pub coin_type: String,
    pub decimals: u32,
    pub pyth_price_id: Option<String>,
}

impl AssetConfig {
    /// Oracle feed id, or a configuration error for assets without one.
    pub fn price_id(&self) -> Result<&str> {
        self.pyth_price_id
            .as_deref()
            .ok_or_else(|| AppError::Config(format!("asset {} has no oracle feed", self.symbol)))
    }
}

/// A venue pool and its trading parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueConfig {
    pub name: String,
    pub pool_id: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    pub tick_size: BigDecimal,
    pub lot_size: BigDecimal,
    pub min_size: BigDecimal,
    pub taker_fee_bps: u32,
    pub maker_fee_bps: u32,
}

#[derive(Debug, Deserialize)]
struct RawMarkets {
    #[serde(default)]
    assets: Vec<RawAsset>,
    #[serde(default)]
    venues: Vec<RawVenue>,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    symbol: String,
    coin_type: String,
    decimals: i64,
    pyth_price_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVenue {
    name: String,
    pool_id: String,
    base_symbol: String,
    quote_symbol: String,
    tick_size: String,
    lot_size: String,
    min_size: String,
    taker_fee_bps: u32,
    maker_fee_bps: u32,
}

/// Immutable symbol/name keyed lookup tables.
#[derive(Debug, Clone)]
pub struct Markets {
    assets: HashMap<String, AssetConfig>,
    venues: HashMap<String, VenueConfig>,
}

impl Markets {
    /// Tables shipped with the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_MARKETS)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: RawMarkets = toml::from_str(text)?;

        let mut assets = HashMap::new();
        for a in raw.assets {
            let decimals = checked_exponent(a.decimals)
                .map_err(|e| AppError::Config(format!("asset {}: {e}", a.symbol)))?;
            let asset = AssetConfig {
                symbol: a.symbol.clone(),
                coin_type: a.coin_type,
                decimals,
                pyth_price_id: a.pyth_price_id.filter(|id| !id.is_empty()),
            };
            if assets.insert(a.symbol.clone(), asset).is_some() {
                return Err(AppError::Config(format!("duplicate asset {}", a.symbol)));
            }
        }

        let mut venues = HashMap::new();
        for v in raw.venues {
            for symbol in [&v.base_symbol, &v.quote_symbol] {
                if !assets.contains_key(symbol) {
                    return Err(AppError::Config(format!(
                        "venue {} references unknown asset {symbol}",
                        v.name
                    )));
                }
            }
            let venue = VenueConfig {
                name: v.name.clone(),
                pool_id: v.pool_id,
                base_symbol: v.base_symbol,
                quote_symbol: v.quote_symbol,
                tick_size: config_decimal(&v.name, "tick_size", &v.tick_size)?,
                lot_size: config_decimal(&v.name, "lot_size", &v.lot_size)?,
                min_size: config_decimal(&v.name, "min_size", &v.min_size)?,
                taker_fee_bps: v.taker_fee_bps,
                maker_fee_bps: v.maker_fee_bps,
            };
            if venues.insert(v.name.clone(), venue).is_some() {
                return Err(AppError::Config(format!("duplicate venue {}", v.name)));
            }
        }

        Ok(Self { assets, venues })
    }

    pub fn asset(&self, symbol: &str) -> Result<&AssetConfig> {
        self.assets
            .get(symbol)
            .ok_or_else(|| AppError::Config(format!("Coin with symbol {symbol} not found")))
    }

    pub fn venue(&self, name: &str) -> Result<&VenueConfig> {
        self.venues
            .get(name)
            .ok_or_else(|| AppError::Config(format!("Pool with name {name} not found")))
    }
}

/// Decimal exponents must be non-negative.
pub fn checked_exponent(value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Config(format!("unsupported decimal exponent {value}")))
}

fn config_decimal(venue: &str, field: &str, raw: &str) -> Result<BigDecimal> {
    let value = parse_decimal(raw)
        .map_err(|e| AppError::Config(format!("venue {venue} {field}: {e}")))?;
    if value < BigDecimal::from(0) {
        return Err(AppError::Config(format!("venue {venue} {field} is negative")));
    }
    Ok(value)
}
