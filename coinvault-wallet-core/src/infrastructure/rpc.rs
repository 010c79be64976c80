//! Ethereum JSON-RPC client
//!
//! Reads chain state for the transaction builder and can broadcast raw
//! transactions directly to a node. A missing or malformed `result` is an
//! error; no gas value is ever substituted.

use crate::domain::repositories::{Broadcaster, ChainClient};
use crate::shared::error::WalletError;
use crate::shared::types::{GasEstimateRequest, TransactionHash};
use crate::shared::utils::{parse_hex_u256, parse_hex_u64};
use crate::shared::WalletResult;
use async_trait::async_trait;
use ethers::types::U256;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub struct RpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one JSON-RPC call and return its `result`
    pub async fn call(&self, method: &str, params: Value) -> WalletResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        log::debug!("RPC {} -> {}", method, self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::network(format!("{} failed: {}", method, e)))?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(|e| {
            if status.is_success() {
                WalletError::server_rejected(Some(format!("Invalid {} response: {}", method, e)))
            } else {
                WalletError::server_rejected(Some(format!("{} returned HTTP {}", method, status)))
            }
        })?;

        parse_rpc_response(method, payload)
    }

    async fn call_quantity(&self, method: &str, params: Value) -> WalletResult<u64> {
        let result = self.call(method, params).await?;
        parse_quantity(method, &result)
    }
}

fn quantity_str<'a>(method: &str, result: &'a Value) -> WalletResult<&'a str> {
    result
        .as_str()
        .ok_or_else(|| WalletError::server_rejected(Some(format!("{} returned a non-string result", method))))
}

/// A node's hex quantity; empty or malformed values are the node's fault, never zero
pub fn parse_quantity(method: &str, result: &Value) -> WalletResult<u64> {
    parse_hex_u64(quantity_str(method, result)?)
        .map_err(|e| WalletError::server_rejected(Some(format!("{} returned {}", method, e.message()))))
}

pub fn parse_quantity_u256(method: &str, result: &Value) -> WalletResult<U256> {
    parse_hex_u256(quantity_str(method, result)?)
        .map_err(|e| WalletError::server_rejected(Some(format!("{} returned {}", method, e.message()))))
}

/// Split a JSON-RPC reply into its result or its error message
pub fn parse_rpc_response(method: &str, payload: Value) -> WalletResult<Value> {
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(error.to_string()));
        return Err(WalletError::server_rejected(message));
    }

    match payload.get("result") {
        Some(result) if !result.is_null() => Ok(result.clone()),
        _ => Err(WalletError::server_rejected(Some(format!("{} returned no result", method)))),
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn transaction_count(&self, address: &str) -> WalletResult<u64> {
        self.call_quantity("eth_getTransactionCount", json!([address, "pending"]))
            .await
    }

    async fn gas_price(&self) -> WalletResult<u64> {
        self.call_quantity("eth_gasPrice", json!([])).await
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> WalletResult<u64> {
        let params = json!([{
            "from": request.from,
            "to": request.to,
            "value": format!("0x{:x}", request.value),
        }]);
        self.call_quantity("eth_estimateGas", params).await
    }

    async fn balance(&self, address: &str) -> WalletResult<U256> {
        let result = self.call("eth_getBalance", json!([address, "latest"])).await?;
        parse_quantity_u256("eth_getBalance", &result)
    }
}

#[async_trait]
impl Broadcaster for RpcClient {
    fn name(&self) -> &'static str {
        "node"
    }

    async fn broadcast_raw(&self, raw_hex: &str) -> WalletResult<Option<TransactionHash>> {
        let result = self.call("eth_sendRawTransaction", json!([raw_hex])).await?;
        Ok(result.as_str().map(str::to_string))
    }
}
