use crate::domain::repositories::{RateProvider, SessionStorage};
use crate::shared::constants::EXCHANGE_RATE_STORAGE_KEY;
use crate::shared::WalletResult;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Exchange rate as persisted in session storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRate {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub provider: String,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRate {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now >= self.fetched_at && now - self.fetched_at < ttl
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RateSource {
    Cache,
    Provider(String),
    /// Configured default; no fresh rate was available
    Fallback,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => f.write_str("cache"),
            Self::Provider(name) => f.write_str(name),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRate {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    pub source: RateSource,
}

impl ExchangeRate {
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.rate
    }
}

/// USD to local currency rate with a storage-backed cache
pub struct ExchangeRateService {
    providers: Vec<Arc<dyn RateProvider>>,
    base: String,
    quote: String,
    ttl: Duration,
    default_rate: f64,
}

impl ExchangeRateService {
    pub fn new(providers: Vec<Arc<dyn RateProvider>>, quote: &str, ttl_hours: i64, default_rate: f64) -> Self {
        Self {
            providers,
            base: "USD".to_string(),
            quote: quote.to_uppercase(),
            ttl: Duration::hours(ttl_hours),
            default_rate,
        }
    }

    pub fn quote_currency(&self) -> &str {
        &self.quote
    }

    pub async fn current(&self, storage: &dyn SessionStorage) -> WalletResult<ExchangeRate> {
        self.current_at(storage, Utc::now()).await
    }

    /// Cached rate if younger than the TTL, else providers in order, else the default
    pub async fn current_at(&self, storage: &dyn SessionStorage, now: DateTime<Utc>) -> WalletResult<ExchangeRate> {
        if let Some(cached) = self.cached(storage)? {
            if cached.is_fresh(now, self.ttl) {
                log::debug!("Serving cached {}/{} rate from {}", self.base, self.quote, cached.fetched_at);
                return Ok(ExchangeRate {
                    base: cached.base,
                    quote: cached.quote,
                    rate: cached.rate,
                    source: RateSource::Cache,
                });
            }
        }
        self.refresh_at(storage, now).await
    }

    /// Ignore the cache and ask the providers
    pub async fn refresh_at(&self, storage: &dyn SessionStorage, now: DateTime<Utc>) -> WalletResult<ExchangeRate> {
        for provider in &self.providers {
            match provider.fetch_rate(&self.base, &self.quote).await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => {
                    let cached = CachedRate {
                        base: self.base.clone(),
                        quote: self.quote.clone(),
                        rate,
                        provider: provider.name().to_string(),
                        fetched_at: now,
                    };
                    storage.set(EXCHANGE_RATE_STORAGE_KEY, &serde_json::to_string(&cached)?)?;
                    log::info!("Live {}/{} rate {:.4} from {}", self.base, self.quote, rate, provider.name());
                    return Ok(ExchangeRate {
                        base: cached.base,
                        quote: cached.quote,
                        rate,
                        source: RateSource::Provider(cached.provider),
                    });
                }
                Ok(rate) => log::warn!("Rate provider {} returned unusable rate {}", provider.name(), rate),
                Err(e) => log::warn!("Rate provider {} failed: {}", provider.name(), e),
            }
        }

        log::warn!(
            "Using default {}/{} rate {:.2}",
            self.base,
            self.quote,
            self.default_rate
        );
        Ok(ExchangeRate {
            base: self.base.clone(),
            quote: self.quote.clone(),
            rate: self.default_rate,
            source: RateSource::Fallback,
        })
    }

    fn cached(&self, storage: &dyn SessionStorage) -> WalletResult<Option<CachedRate>> {
        let Some(raw) = storage.get(EXCHANGE_RATE_STORAGE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<CachedRate>(&raw) {
            Ok(cached) if cached.base == self.base && cached.quote == self.quote => Ok(Some(cached)),
            Ok(_) => Ok(None),
            Err(e) => {
                log::warn!("Ignoring unreadable cached exchange rate: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStorage;
    use crate::shared::error::WalletError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRate {
        rate: WalletResult<f64>,
        calls: AtomicUsize,
    }

    impl CountingRate {
        fn new(rate: WalletResult<f64>) -> Arc<Self> {
            Arc::new(Self {
                rate,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RateProvider for CountingRate {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_rate(&self, _base: &str, _quote: &str) -> WalletResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rate.clone()
        }
    }

    fn seed_cache(storage: &MemoryStorage, rate: f64, fetched_at: DateTime<Utc>) {
        let cached = CachedRate {
            base: "USD".to_string(),
            quote: "GHS".to_string(),
            rate,
            provider: "earlier".to_string(),
            fetched_at,
        };
        storage
            .set(EXCHANGE_RATE_STORAGE_KEY, &serde_json::to_string(&cached).unwrap())
            .unwrap();
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let provider = CountingRate::new(Ok(16.0));
        let service = ExchangeRateService::new(vec![provider.clone()], "GHS", 24, 15.0);
        let storage = MemoryStorage::new();
        let now = Utc::now();
        seed_cache(&storage, 15.4, now - Duration::hours(23));

        let rate = service.current_at(&storage, now).await.unwrap();
        assert_eq!(rate.rate, 15.4);
        assert_eq!(rate.source, RateSource::Cache);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_is_refetched_and_stored() {
        let provider = CountingRate::new(Ok(16.0));
        let service = ExchangeRateService::new(vec![provider.clone()], "GHS", 24, 15.0);
        let storage = MemoryStorage::new();
        let now = Utc::now();
        seed_cache(&storage, 15.4, now - Duration::hours(25));

        let rate = service.current_at(&storage, now).await.unwrap();
        assert_eq!(rate.rate, 16.0);
        assert_eq!(rate.source, RateSource::Provider("counting".to_string()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // the new value now serves from cache
        let again = service.current_at(&storage, now + Duration::hours(1)).await.unwrap();
        assert_eq!(again.source, RateSource::Cache);
        assert_eq!(again.rate, 16.0);
    }

    #[tokio::test]
    async fn test_all_providers_down_uses_default() {
        let down = CountingRate::new(Err(WalletError::network("offline")));
        let zero = CountingRate::new(Ok(0.0));
        let service = ExchangeRateService::new(vec![down.clone(), zero.clone()], "ghs", 24, 15.0);
        let storage = MemoryStorage::new();

        let rate = service.current(&storage).await.unwrap();
        assert_eq!(rate.rate, 15.0);
        assert_eq!(rate.source, RateSource::Fallback);
        assert_eq!(rate.quote, "GHS");
        assert_eq!(down.calls.load(Ordering::SeqCst), 1);
        assert_eq!(zero.calls.load(Ordering::SeqCst), 1);
        // a fallback is never cached
        assert_eq!(storage.get(EXCHANGE_RATE_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_for_other_currency_is_ignored() {
        let provider = CountingRate::new(Ok(1600.0));
        let service = ExchangeRateService::new(vec![provider.clone()], "NGN", 24, 1500.0);
        let storage = MemoryStorage::new();
        seed_cache(&storage, 15.4, Utc::now());

        let rate = service.current(&storage).await.unwrap();
        assert_eq!(rate.rate, 1600.0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_convert() {
        let rate = ExchangeRate {
            base: "USD".to_string(),
            quote: "GHS".to_string(),
            rate: 15.0,
            source: RateSource::Fallback,
        };
        assert_eq!(rate.convert(10.0), 150.0);
    }
}
