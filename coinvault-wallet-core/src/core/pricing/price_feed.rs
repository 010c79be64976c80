use crate::domain::entities::AssetInfo;
use crate::domain::repositories::PriceProvider;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Where a displayed price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceSource {
    Provider(&'static str),
    /// Configured default; every provider failed for this asset
    Fallback,
}

impl PriceSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(name) => f.write_str(name),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderAttempt {
    pub provider: &'static str,
    /// Number of prices obtained, or the failure message
    pub result: Result<usize, String>,
}

/// Raw result of asking the providers, before any default is applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub prices: HashMap<String, (f64, &'static str)>,
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchOutcome {
    pub fn missing<'a>(&self, assets: &'a [AssetInfo]) -> Vec<&'a AssetInfo> {
        assets
            .iter()
            .filter(|asset| !self.prices.contains_key(asset.symbol))
            .collect()
    }
}

/// Asks price providers in order until every asset is priced
pub struct PriceFeed {
    providers: Vec<Arc<dyn PriceProvider>>,
}

impl PriceFeed {
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>) -> Self {
        Self { providers }
    }

    /// Later providers are only asked for assets earlier ones did not price
    pub async fn fetch(&self, assets: &[AssetInfo]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        for provider in &self.providers {
            let wanted: Vec<AssetInfo> = outcome.missing(assets).into_iter().copied().collect();
            if wanted.is_empty() {
                break;
            }

            match provider.fetch_prices(&wanted).await {
                Ok(prices) => {
                    let mut added = 0;
                    for asset in &wanted {
                        if let Some(price) = prices.get(asset.symbol) {
                            outcome
                                .prices
                                .insert(asset.symbol.to_string(), (*price, provider.name()));
                            added += 1;
                        }
                    }
                    log::debug!("{} priced {} of {} assets", provider.name(), added, wanted.len());
                    outcome.attempts.push(ProviderAttempt {
                        provider: provider.name(),
                        result: Ok(added),
                    });
                }
                Err(e) => {
                    log::warn!("Price provider {} failed: {}", provider.name(), e);
                    outcome.attempts.push(ProviderAttempt {
                        provider: provider.name(),
                        result: Err(e.to_string()),
                    });
                }
            }
        }

        outcome
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub usd: f64,
    pub source: PriceSource,
}

/// USD prices keyed by upper-case symbol, each tagged with its source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceTable {
    entries: BTreeMap<String, PriceQuote>,
}

impl PriceTable {
    pub fn insert(&mut self, symbol: &str, quote: PriceQuote) {
        self.entries.insert(symbol.to_uppercase(), quote);
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceQuote> {
        self.entries.get(&symbol.to_uppercase())
    }

    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).map(|quote| quote.usd)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PriceQuote)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_fallback(&self) -> bool {
        self.entries.values().any(|quote| quote.source.is_fallback())
    }
}

/// Fills assets the providers could not price from configured defaults
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    defaults: HashMap<String, f64>,
}

impl FallbackPolicy {
    pub fn new(defaults: HashMap<String, f64>) -> Self {
        let defaults = defaults
            .into_iter()
            .map(|(symbol, price)| (symbol.to_uppercase(), price))
            .collect();
        Self { defaults }
    }

    /// Assets with neither a fetched price nor a default are left out
    pub fn apply(&self, outcome: &FetchOutcome, assets: &[AssetInfo]) -> PriceTable {
        let mut table = PriceTable::default();
        for asset in assets {
            if let Some((usd, provider)) = outcome.prices.get(asset.symbol) {
                table.insert(
                    asset.symbol,
                    PriceQuote {
                        usd: *usd,
                        source: PriceSource::Provider(*provider),
                    },
                );
            } else if let Some(usd) = self.defaults.get(asset.symbol) {
                log::info!("Using fallback price for {}", asset.symbol);
                table.insert(
                    asset.symbol,
                    PriceQuote {
                        usd: *usd,
                        source: PriceSource::Fallback,
                    },
                );
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{asset_by_symbol, SUPPORTED_ASSETS};
    use crate::shared::error::WalletError;
    use crate::shared::WalletResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedProvider {
        name: &'static str,
        prices: WalletResult<HashMap<String, f64>>,
        asked: Mutex<Vec<Vec<String>>>,
    }

    impl FixedProvider {
        fn new(name: &'static str, prices: WalletResult<Vec<(&str, f64)>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                prices: prices.map(|p| p.into_iter().map(|(s, v)| (s.to_string(), v)).collect()),
                asked: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PriceProvider for FixedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_prices(&self, assets: &[AssetInfo]) -> WalletResult<HashMap<String, f64>> {
            self.asked
                .lock()
                .unwrap()
                .push(assets.iter().map(|a| a.symbol.to_string()).collect());
            self.prices.clone()
        }
    }

    fn assets(symbols: &[&str]) -> Vec<AssetInfo> {
        symbols.iter().map(|s| *asset_by_symbol(s).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_later_providers_fill_gaps_only() {
        let first = FixedProvider::new("first", Ok(vec![("BTC", 64000.0)]));
        let second = FixedProvider::new("second", Ok(vec![("BTC", 1.0), ("ETH", 3100.0)]));
        let feed = PriceFeed::new(vec![first.clone(), second.clone()]);

        let outcome = feed.fetch(&assets(&["BTC", "ETH"])).await;
        assert_eq!(outcome.prices.get("BTC"), Some(&(64000.0, "first")));
        assert_eq!(outcome.prices.get("ETH"), Some(&(3100.0, "second")));
        assert_eq!(second.asked.lock().unwrap()[0], vec!["ETH".to_string()]);
    }

    #[tokio::test]
    async fn test_failures_are_recorded_and_skipped() {
        let down = FixedProvider::new("down", Err(WalletError::network("timeout")));
        let up = FixedProvider::new("up", Ok(vec![("ETH", 3100.0)]));
        let feed = PriceFeed::new(vec![down, up]);

        let outcome = feed.fetch(&assets(&["ETH"])).await;
        assert_eq!(outcome.attempts.len(), 2);
        assert!(outcome.attempts[0].result.is_err());
        assert_eq!(outcome.attempts[1].result, Ok(1));
    }

    #[tokio::test]
    async fn test_stops_once_everything_is_priced() {
        let first = FixedProvider::new("first", Ok(vec![("ETH", 3100.0)]));
        let second = FixedProvider::new("second", Ok(vec![]));
        let feed = PriceFeed::new(vec![first, second.clone()]);

        feed.fetch(&assets(&["ETH"])).await;
        assert!(second.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_policy_marks_defaults() {
        let feed = PriceFeed::new(vec![FixedProvider::new("only", Ok(vec![("BTC", 64000.0)]))]);
        let outcome = feed.fetch(SUPPORTED_ASSETS).await;

        let defaults = SUPPORTED_ASSETS
            .iter()
            .map(|a| (a.symbol.to_lowercase(), a.fallback_price))
            .collect();
        let table = FallbackPolicy::new(defaults).apply(&outcome, SUPPORTED_ASSETS);

        assert_eq!(table.len(), SUPPORTED_ASSETS.len());
        assert_eq!(table.get("btc").unwrap().source, PriceSource::Provider("only"));
        assert_eq!(table.get("ETH").unwrap().source, PriceSource::Fallback);
        assert_eq!(table.price("DOGE"), Some(0.09));
        assert!(table.has_fallback());
    }

    #[test]
    fn test_assets_without_default_are_omitted() {
        let table = FallbackPolicy::new(HashMap::new()).apply(&FetchOutcome::default(), SUPPORTED_ASSETS);
        assert!(table.is_empty());
    }
}
