//! Read-only Sui full-node JSON-RPC adapter.

use super::transaction::Transaction;
use super::{BalanceReader, OrderBook};
use crate::deepbook::{self, decode_order_page, scale_orders};
use crate::errors::{AppError, Result};
use crate::markets::AssetConfig;
use crate::models::{Balances, ScaledOrder};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBalance {
    coin_type: String,
    total_balance: String,
}

#[derive(Debug, Deserialize)]
struct DevInspectResults {
    results: Option<Vec<ExecutionResult>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionResult {
    #[serde(default)]
    return_values: Vec<(Vec<u8>, String)>,
}

/// Handle for one full node.
#[derive(Clone)]
pub struct SuiRpcClient {
    client: Client,
    rpc_url: Url,
}

impl SuiRpcClient {
    pub fn new(rpc_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, rpc_url })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response: JsonRpcResponse<T> = self
            .client
            .post(self.rpc_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ChainQuery(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::ChainQuery(format!("{method}: {e}")))?;
        if let Some(err) = response.error {
            return Err(AppError::ChainQuery(format!("{method}: {err}")));
        }
        response
            .result
            .ok_or_else(|| AppError::ChainQuery(format!("{method}: empty result")))
    }

    pub async fn initial_shared_version(&self, object_id: &str) -> Result<u64> {
        let object: Value = self
            .call("sui_getObject", json!([object_id, { "showOwner": true }]))
            .await?;
        initial_shared_version(&object)
            .ok_or_else(|| AppError::ChainQuery(format!("object {object_id} is not shared")))
    }

    /// Dev-inspect `tx` and return the first return value of every command.
    pub async fn dev_inspect(&self, sender: &str, tx: &Transaction) -> Result<Vec<Vec<u8>>> {
        let tx_bytes = base64::engine::general_purpose::STANDARD.encode(tx.to_kind_bytes()?);
        let results: DevInspectResults = self
            .call("sui_devInspectTransactionBlock", json!([sender, tx_bytes]))
            .await?;
        first_return_values(results)
    }
}

#[async_trait]
impl OrderBook for SuiRpcClient {
    async fn open_orders(
        &self,
        pool_id: &str,
        base: &AssetConfig,
        quote: &AssetConfig,
    ) -> Result<Vec<ScaledOrder>> {
        let mut tx = order_query_transaction(pool_id, &base.coin_type, &quote.coin_type)?;
        for id in tx.unresolved_objects() {
            let version = self.initial_shared_version(&id).await?;
            tx.resolve_shared(&id, version, false)?;
        }

        let pages = self.dev_inspect(pool_id, &tx).await?;
        if pages.len() != 2 {
            return Err(AppError::ChainQuery(format!(
                "order query returned {} pages, expected 2",
                pages.len()
            )));
        }

        let mut orders = Vec::new();
        for (side, raw) in ["bids", "asks"].into_iter().zip(&pages) {
            let page = decode_order_page(raw)?;
            if page.has_next_page {
                warn!(side, pool_id, limit = deepbook::ORDER_QUERY_LIMIT, "[BOOK] order page truncated");
            }
            debug!(side, count = page.orders.len(), "[BOOK] decoded order page");
            orders.extend(scale_orders(&page.orders, base.decimals, quote.decimals)?);
        }
        Ok(orders)
    }
}

#[async_trait]
impl BalanceReader for SuiRpcClient {
    async fn balances(&self, owner: &str) -> Result<Balances> {
        let raw: Vec<RawBalance> = self.call("suix_getAllBalances", json!([owner])).await?;
        parse_balances(raw)
    }
}

/// Two `order_query::iter_orders` calls over the whole book: bids, then asks.
pub fn order_query_transaction(pool_id: &str, base_type: &str, quote_type: &str) -> Result<Transaction> {
    let target = format!("{}::order_query::iter_orders", deepbook::PACKAGE_ID);
    let mut tx = Transaction::new();
    for bids in [true, false] {
        let pool = tx.object(pool_id);
        let start_order_id = tx.pure_none();
        let end_order_id = tx.pure_none();
        let min_expire_timestamp = tx.pure_none();
        let limit = tx.pure_u64(deepbook::ORDER_QUERY_LIMIT);
        let side = tx.pure_bool(bids);
        tx.move_call(
            &target,
            &[base_type, quote_type],
            vec![pool, start_order_id, end_order_id, min_expire_timestamp, limit, side],
        )?;
    }
    Ok(tx)
}

fn parse_balances(raw: Vec<RawBalance>) -> Result<Balances> {
    raw.into_iter()
        .map(|b| {
            let amount = b.total_balance.parse::<u128>().map_err(|_| {
                AppError::Parse(format!("balance of {}: {:?}", b.coin_type, b.total_balance))
            })?;
            Ok((b.coin_type, amount))
        })
        .collect()
}

fn initial_shared_version(object: &Value) -> Option<u64> {
    let version = object
        .get("data")?
        .get("owner")?
        .get("Shared")?
        .get("initial_shared_version")?;
    match version {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn first_return_values(results: DevInspectResults) -> Result<Vec<Vec<u8>>> {
    if let Some(err) = results.error {
        return Err(AppError::ChainQuery(format!("dev inspect failed: {err}")));
    }
    results
        .results
        .ok_or_else(|| AppError::ChainQuery("dev inspect returned no results".into()))?
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            r.return_values
                .into_iter()
                .next()
                .map(|(bytes, _type)| bytes)
                .ok_or_else(|| AppError::ChainQuery(format!("command {i} returned nothing")))
        })
        .collect()
}
