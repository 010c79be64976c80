//! Public price and exchange-rate APIs
//!
//! Each provider is a thin HTTP call plus a pure parse function, so the
//! parsing is tested against captured payloads without a network.

use super::portfolio::MarketEntry;
use crate::domain::entities::AssetInfo;
use crate::domain::repositories::{PriceProvider, RateProvider};
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub fn http_client(timeout: Duration) -> WalletResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| WalletError::config(format!("Failed to build HTTP client: {}", e)))
}

async fn get_json(client: &Client, url: &str) -> WalletResult<Value> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| WalletError::network(format!("GET {} failed: {}", url, e)))?;
    check_status(url, response.status())?;
    Ok(response.json().await?)
}

/// Non-2xx answers are rejections, never payloads to parse
pub fn check_status(url: &str, status: StatusCode) -> WalletResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(WalletError::server_rejected(Some(format!("GET {} returned HTTP {}", url, status))))
    }
}

fn as_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }?;
    (price.is_finite() && price > 0.0).then_some(price)
}

fn malformed(provider: &str) -> WalletError {
    WalletError::server_rejected(Some(format!("{} returned an unexpected payload", provider)))
}

/// `simple/price?ids=..&vs_currencies=usd` -> `{ "bitcoin": { "usd": 43250 } }`
pub fn parse_coingecko_prices(body: &Value, assets: &[AssetInfo]) -> HashMap<String, f64> {
    assets
        .iter()
        .filter_map(|asset| {
            let price = as_price(body.get(asset.coingecko_id)?.get("usd")?)?;
            Some((asset.symbol.to_string(), price))
        })
        .collect()
}

/// `v2/prices/BTC-USD/spot` -> `{ "data": { "amount": "43250.12", ... } }`
pub fn parse_coinbase_spot(body: &Value) -> Option<f64> {
    as_price(body.get("data")?.get("amount")?)
}

/// `data/pricemulti?fsyms=..&tsyms=USD` -> `{ "BTC": { "USD": 43250 } }`
pub fn parse_cryptocompare_prices(body: &Value, assets: &[AssetInfo]) -> HashMap<String, f64> {
    assets
        .iter()
        .filter_map(|asset| {
            let price = as_price(body.get(asset.symbol)?.get("USD")?)?;
            Some((asset.symbol.to_string(), price))
        })
        .collect()
}

/// `api/v3/ticker/price` -> `[ { "symbol": "BTCUSDT", "price": "43250.00" } ]`
///
/// Prices are quoted in USDT, which is taken at par; USDT itself is 1.
pub fn parse_binance_tickers(body: &Value, assets: &[AssetInfo]) -> HashMap<String, f64> {
    let tickers: HashMap<&str, f64> = body
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| Some((entry.get("symbol")?.as_str()?, as_price(entry.get("price")?)?)))
                .collect()
        })
        .unwrap_or_default();

    assets
        .iter()
        .filter_map(|asset| match asset.binance_pair() {
            Some(pair) => tickers
                .get(pair.as_str())
                .map(|price| (asset.symbol.to_string(), *price)),
            None => Some((asset.symbol.to_string(), 1.0)),
        })
        .collect()
}

/// exchangerate.host: `{ "rates": { "GHS": 15.2 } }` or `{ "quotes": { "USDGHS": 15.2 } }`
pub fn parse_exchangerate_host(body: &Value, base: &str, quote: &str) -> Option<f64> {
    body.get("rates")
        .and_then(|rates| rates.get(quote))
        .and_then(as_price)
        .or_else(|| {
            body.get("quotes")
                .and_then(|quotes| quotes.get(format!("{}{}", base, quote).as_str()))
                .and_then(as_price)
        })
}

/// open.er-api.com: `{ "result": "success", "rates": { "GHS": 15.2 } }`
pub fn parse_open_er_api(body: &Value, quote: &str) -> Option<f64> {
    if body.get("result").and_then(Value::as_str) != Some("success") {
        return None;
    }
    as_price(body.get("rates")?.get(quote)?)
}

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, COINGECKO_API_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Top coins by market cap, the listing the market page shows
    pub async fn fetch_markets(&self, limit: usize) -> WalletResult<Vec<MarketEntry>> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1",
            self.base_url, limit
        );
        let body = get_json(&self.client, &url).await?;
        serde_json::from_value(body).map_err(|_| malformed("coingecko"))
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch_prices(&self, assets: &[AssetInfo]) -> WalletResult<HashMap<String, f64>> {
        let ids: Vec<&str> = assets.iter().map(|asset| asset.coingecko_id).collect();
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.base_url,
            ids.join(",")
        );
        let body = get_json(&self.client, &url).await?;
        Ok(parse_coingecko_prices(&body, assets))
    }
}

pub struct CoinbaseProvider {
    client: Client,
    base_url: String,
}

impl CoinbaseProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: COINBASE_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl PriceProvider for CoinbaseProvider {
    fn name(&self) -> &'static str {
        "coinbase"
    }

    /// One request per asset; assets Coinbase does not list are skipped
    async fn fetch_prices(&self, assets: &[AssetInfo]) -> WalletResult<HashMap<String, f64>> {
        let mut prices = HashMap::new();
        let mut last_error = None;
        for asset in assets {
            let url = format!("{}/prices/{}/spot", self.base_url, asset.coinbase_pair());
            match get_json(&self.client, &url).await {
                Ok(body) => {
                    if let Some(price) = parse_coinbase_spot(&body) {
                        prices.insert(asset.symbol.to_string(), price);
                    }
                }
                Err(e) => {
                    log::debug!("coinbase: {} unavailable: {}", asset.symbol, e);
                    last_error = Some(e);
                }
            }
        }
        match (prices.is_empty(), last_error) {
            (true, Some(error)) => Err(error),
            _ => Ok(prices),
        }
    }
}

pub struct CryptoCompareProvider {
    client: Client,
    base_url: String,
}

impl CryptoCompareProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: CRYPTOCOMPARE_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl PriceProvider for CryptoCompareProvider {
    fn name(&self) -> &'static str {
        "cryptocompare"
    }

    async fn fetch_prices(&self, assets: &[AssetInfo]) -> WalletResult<HashMap<String, f64>> {
        let symbols: Vec<&str> = assets.iter().map(|asset| asset.symbol).collect();
        let url = format!("{}/pricemulti?fsyms={}&tsyms=USD", self.base_url, symbols.join(","));
        let body = get_json(&self.client, &url).await?;
        if body.get("Response").and_then(Value::as_str) == Some("Error") {
            return Err(malformed(self.name()));
        }
        Ok(parse_cryptocompare_prices(&body, assets))
    }
}

pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

impl BinanceProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: BINANCE_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl PriceProvider for BinanceProvider {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch_prices(&self, assets: &[AssetInfo]) -> WalletResult<HashMap<String, f64>> {
        let pairs: Vec<String> = assets
            .iter()
            .filter_map(AssetInfo::binance_pair)
            .map(|pair| format!("\"{}\"", pair))
            .collect();
        let url = format!("{}/ticker/price?symbols=[{}]", self.base_url, pairs.join(","));
        let body = get_json(&self.client, &url).await?;
        if !body.is_array() {
            return Err(malformed(self.name()));
        }
        Ok(parse_binance_tickers(&body, assets))
    }
}

pub struct ExchangeRateHostProvider {
    client: Client,
    base_url: String,
}

impl ExchangeRateHostProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: EXCHANGERATE_HOST_URL.to_string(),
        }
    }
}

#[async_trait]
impl RateProvider for ExchangeRateHostProvider {
    fn name(&self) -> &'static str {
        "exchangerate.host"
    }

    async fn fetch_rate(&self, base: &str, quote: &str) -> WalletResult<f64> {
        let url = format!("{}/latest?base={}&symbols={}", self.base_url, base, quote);
        let body = get_json(&self.client, &url).await?;
        parse_exchangerate_host(&body, base, quote).ok_or_else(|| malformed(self.name()))
    }
}

pub struct OpenErApiProvider {
    client: Client,
    base_url: String,
}

impl OpenErApiProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPEN_ER_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    fn name(&self) -> &'static str {
        "open.er-api"
    }

    async fn fetch_rate(&self, base: &str, quote: &str) -> WalletResult<f64> {
        let url = format!("{}/latest/{}", self.base_url, base);
        let body = get_json(&self.client, &url).await?;
        parse_open_er_api(&body, quote).ok_or_else(|| malformed(self.name()))
    }
}

/// Price providers in fallback order
pub fn default_price_providers(client: &Client) -> Vec<Arc<dyn PriceProvider>> {
    vec![
        Arc::new(CoinGeckoProvider::new(client.clone())),
        Arc::new(CoinbaseProvider::new(client.clone())),
        Arc::new(CryptoCompareProvider::new(client.clone())),
        Arc::new(BinanceProvider::new(client.clone())),
    ]
}

/// Rate providers in fallback order
pub fn default_rate_providers(client: &Client) -> Vec<Arc<dyn RateProvider>> {
    vec![
        Arc::new(ExchangeRateHostProvider::new(client.clone())),
        Arc::new(OpenErApiProvider::new(client.clone())),
    ]
}
