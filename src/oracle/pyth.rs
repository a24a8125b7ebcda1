use super::PriceOracle;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const HERMES_ENDPOINT: &str = "https://hermes.pyth.network";

#[derive(Debug, Deserialize)]
struct LatestUpdates {
    #[serde(default)]
    parsed: Vec<ParsedUpdate>,
}

#[derive(Debug, Deserialize)]
struct ParsedUpdate {
    id: String,
    price: RawPrice,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    price: String,
    expo: i32,
    publish_time: i64,
}

/// Client for the Pyth Hermes price service.
#[derive(Clone)]
pub struct HermesClient {
    client: Client,
    endpoint: Url,
}

impl HermesClient {
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl PriceOracle for HermesClient {
    async fn price(&self, price_id: &str) -> Result<BigDecimal> {
        let mut url = self.endpoint.join("v2/updates/price/latest")?;
        url.query_pairs_mut().append_pair("ids[]", price_id);

        let updates: LatestUpdates = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::OracleUnavailable(format!("{price_id}: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::OracleUnavailable(format!("{price_id}: {e}")))?;

        let update = updates
            .parsed
            .first()
            .ok_or_else(|| AppError::OracleUnavailable(format!("{price_id}: no parsed update")))?;
        debug!(id = %update.id, publish_time = update.price.publish_time, "[ORACLE] price update");
        scaled_price(&update.price)
    }
}

/// `price * 10^expo`, exactly.
fn scaled_price(raw: &RawPrice) -> Result<BigDecimal> {
    let mantissa: BigInt = raw
        .price
        .parse()
        .map_err(|_| AppError::OracleUnavailable(format!("malformed price {:?}", raw.price)))?;
    if mantissa.sign() != num_bigint::Sign::Plus {
        return Err(AppError::OracleUnavailable(format!(
            "non-positive price {}",
            raw.price
        )));
    }
    Ok(BigDecimal::new(mantissa, -i64::from(raw.expo)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deepbook::scale::format_decimal;

    #[test]
    fn parse_latest_update_shape() {
        let raw = r#"{
            "binary": {"encoding": "hex", "data": ["504e4155"]},
            "parsed": [{
                "id": "23d7315113f5b1d3ba7a83604c44b94d79f4fd69af77f804fc7f920a6dc65744",
                "price": {"price": "363184970", "conf": "290712", "expo": -8, "publish_time": 1736000000},
                "ema_price": {"price": "364000000", "conf": "300000", "expo": -8, "publish_time": 1736000000},
                "metadata": {"slot": 1, "proof_available_time": 1736000001, "prev_publish_time": 1735999999}
            }]
        }"#;
        let updates: LatestUpdates = serde_json::from_str(raw).expect("json should parse");
        let price = scaled_price(&updates.parsed[0].price).unwrap();
        assert_eq!(format_decimal(&price), "3.6318497");
    }

    #[test]
    fn positive_exponent_and_bad_prices() {
        let p = RawPrice { price: "12".into(), expo: 2, publish_time: 0 };
        assert_eq!(format_decimal(&scaled_price(&p).unwrap()), "1200");

        for bad in ["0", "-5", "x"] {
            let p = RawPrice { price: bad.into(), expo: -8, publish_time: 0 };
            assert!(matches!(scaled_price(&p), Err(AppError::OracleUnavailable(_))), "{bad}");
        }
    }

    #[test]
    fn missing_parsed_defaults_empty() {
        let updates: LatestUpdates = serde_json::from_str(r#"{"binary": {}}"#).unwrap();
        assert!(updates.parsed.is_empty());
    }
}
