//! HTTP client for the CoinVault backend
//!
//! One client serves the auth endpoints, the wallet registry, key retrieval
//! and broadcast. Every response goes through [`parse_api_response`]:
//! transport failures are `NetworkUnavailable`, a non-2xx status or
//! `success: false` is `ServerRejected` with the server's own message.

use crate::domain::repositories::{
    AuthService, Broadcaster, KeySource, LoginRequest, RegisterRequest, WalletRegistration, WalletRegistry,
};
use crate::shared::error::WalletError;
use crate::shared::types::{AuthSession, Balance, EncryptedKey, TransactionHash, TransactionRecord, User};
use crate::shared::WalletResult;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse {
    #[serde(default)]
    client_encrypted_private_key: Option<EncryptedKey>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(default)]
    balance: Value,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    #[serde(default, alias = "txHash", alias = "transactionHash")]
    hash: Option<TransactionHash>,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token attached to every subsequent request
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().ok().and_then(|t| t.clone()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> WalletResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        log::debug!("{} {}", method, url);

        let mut builder = self.authorize(self.client.request(method, &url));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| WalletError::network(format!("Cannot connect to server: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WalletError::network(format!("Connection dropped: {}", e)))?;

        let value = parse_api_response(status, &text)?;
        serde_json::from_value(value)
            .map_err(|e| WalletError::server_rejected(Some(format!("Unexpected response from {}: {}", path, e))))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> WalletResult<T> {
        self.send::<Value, T>(Method::GET, path, None).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> WalletResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }
}

/// Apply the response policy to a raw status and body
pub fn parse_api_response(status: StatusCode, body: &str) -> WalletResult<Value> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if status.is_success() => {
            return Err(WalletError::server_rejected(Some("Invalid response from server".to_string())))
        }
        Err(_) => return Err(WalletError::server_rejected(None)),
    };

    let success = value.get("success").and_then(Value::as_bool);
    if !status.is_success() || success == Some(false) {
        let message = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string);
        log::warn!("Server rejected request with status {}", status);
        return Err(WalletError::server_rejected(message));
    }

    Ok(value)
}

#[async_trait]
impl AuthService for ApiClient {
    async fn login(&self, request: &LoginRequest) -> WalletResult<AuthSession> {
        let response: AuthResponse = self.post("auth/login", request).await?;
        log::info!("Signed in as {}", request.email());
        Ok(AuthSession {
            token: response.token,
            user: response.user,
        })
    }

    async fn register(&self, request: &RegisterRequest) -> WalletResult<AuthSession> {
        let response: AuthResponse = self.post("auth/register", request).await?;
        log::info!("Registered {}", request.email());
        Ok(AuthSession {
            token: response.token,
            user: response.user,
        })
    }

    async fn me(&self, token: &str) -> WalletResult<User> {
        let url = self.url("auth/me");
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| WalletError::network(format!("Cannot connect to server: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WalletError::network(format!("Connection dropped: {}", e)))?;
        let value = parse_api_response(status, &text)?;
        let me: MeResponse = serde_json::from_value(value)
            .map_err(|e| WalletError::server_rejected(Some(format!("Unexpected response from auth/me: {}", e))))?;
        Ok(me.user)
    }

    fn use_token(&self, token: Option<&str>) {
        self.set_token(token.map(str::to_string));
    }
}

#[async_trait]
impl WalletRegistry for ApiClient {
    async fn create_wallet(&self, registration: &WalletRegistration) -> WalletResult<()> {
        let _: Value = self.post("wallet/create", registration).await?;
        Ok(())
    }

    async fn import_wallet(&self, registration: &WalletRegistration) -> WalletResult<()> {
        let _: Value = self.post("wallet/import", registration).await?;
        Ok(())
    }

    async fn balance(&self, address: &str) -> WalletResult<Balance> {
        let response: BalanceResponse = self.get(&format!("wallet/balance/{}", address)).await?;
        Ok(match response.balance {
            Value::String(balance) => balance,
            Value::Null => "0".to_string(),
            other => other.to_string(),
        })
    }

    async fn transactions(&self) -> WalletResult<Vec<TransactionRecord>> {
        let response: TransactionsResponse = self.get("wallet/transactions").await?;
        Ok(response.transactions)
    }
}

#[async_trait]
impl KeySource for ApiClient {
    async fn encrypted_key(&self, address: &str) -> WalletResult<Option<EncryptedKey>> {
        let response = self
            .post("wallet/request-key", &json!({ "walletAddress": address }))
            .await;
        key_from_response(response)
    }
}

/// A registry refusal naming a keyless wallet means there is nothing to sign with
fn key_from_response(response: WalletResult<KeyResponse>) -> WalletResult<Option<EncryptedKey>> {
    match response {
        Ok(response) => Ok(response
            .client_encrypted_private_key
            .filter(|key| !key.trim().is_empty())),
        Err(WalletError::ServerRejected(message)) if names_missing_key(&message) => {
            Err(WalletError::missing_key(message))
        }
        Err(e) => Err(e),
    }
}

fn names_missing_key(message: &str) -> bool {
    let message = message.to_lowercase();
    ["watch-only", "watch only", "no private key", "no encrypted key"]
        .iter()
        .any(|marker| message.contains(marker))
}

#[async_trait]
impl Broadcaster for ApiClient {
    fn name(&self) -> &'static str {
        "registry"
    }

    async fn broadcast_raw(&self, raw_hex: &str) -> WalletResult<Option<TransactionHash>> {
        let response: BroadcastResponse = self
            .post("wallet/broadcast", &json!({ "signedTransaction": raw_hex }))
            .await?;
        Ok(response.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::GENERIC_FAILURE_MESSAGE;

    #[test]
    fn test_success_passes_body_through() {
        let value = parse_api_response(StatusCode::OK, r#"{"success":true,"balance":"1.5"}"#).unwrap();
        let balance: BalanceResponse = serde_json::from_value(value).unwrap();
        assert_eq!(balance.balance, json!("1.5"));
    }

    #[test]
    fn test_success_false_carries_error_text() {
        let error = parse_api_response(
            StatusCode::OK,
            r#"{"success":false,"error":"This is a watch-only wallet"}"#,
        )
        .unwrap_err();
        assert_eq!(error, WalletError::ServerRejected("This is a watch-only wallet".to_string()));
    }

    #[test]
    fn test_request_key_refusal_for_watch_only_is_missing_key() {
        let rejected = parse_api_response(
            StatusCode::OK,
            r#"{"success":false,"error":"This is a watch-only wallet"}"#,
        )
        .and_then(|value| Ok(serde_json::from_value::<KeyResponse>(value)?));
        let error = key_from_response(rejected).unwrap_err();
        assert!(matches!(error, WalletError::MissingKey(_)));
        assert!(error.is_auth_failure());

        let empty: KeyResponse = serde_json::from_value(json!({"success": true, "clientEncryptedPrivateKey": ""})).unwrap();
        assert_eq!(key_from_response(Ok(empty)).unwrap(), None);

        let key: KeyResponse = serde_json::from_value(json!({"success": true, "clientEncryptedPrivateKey": "$cv1$x"})).unwrap();
        assert_eq!(key_from_response(Ok(key)).unwrap().as_deref(), Some("$cv1$x"));
    }

    #[test]
    fn test_request_key_other_failures_pass_through() {
        let error = key_from_response(Err(WalletError::ServerRejected("Wallet not found".to_string()))).unwrap_err();
        assert_eq!(error, WalletError::ServerRejected("Wallet not found".to_string()));

        let error = key_from_response(Err(WalletError::network("offline"))).unwrap_err();
        assert!(error.is_network_unavailable());
    }

    #[test]
    fn test_non_2xx_prefers_message() {
        let error = parse_api_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Wallet already exists","error":"dup"}"#,
        )
        .unwrap_err();
        assert_eq!(error.message(), "Wallet already exists");
    }

    #[test]
    fn test_non_json_error_uses_generic_message() {
        let error = parse_api_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(error.message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_broadcast_hash_aliases() {
        for body in [
            json!({"success": true, "txHash": "0xaa"}),
            json!({"success": true, "transactionHash": "0xaa"}),
            json!({"success": true, "hash": "0xaa"}),
        ] {
            let response: BroadcastResponse = serde_json::from_value(body).unwrap();
            assert_eq!(response.hash.as_deref(), Some("0xaa"));
        }
        let response: BroadcastResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(response.hash.is_none());
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:5000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/wallet/create"), "http://localhost:5000/api/wallet/create");
        assert!(!client.has_token());
        client.set_token(Some("t".to_string()));
        assert!(client.has_token());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_unavailable() {
        let client = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(2)).unwrap();
        let error = client.transactions().await.unwrap_err();
        assert!(error.is_network_unavailable());
    }
}
