//! Price and exchange-rate sources

use crate::domain::entities::AssetInfo;
use crate::shared::WalletResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// A USD price source for a set of assets
///
/// Returns what the provider knows; assets it does not list are simply absent.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Symbol → USD price
    async fn fetch_prices(&self, assets: &[AssetInfo]) -> WalletResult<HashMap<String, f64>>;
}

/// A fiat exchange-rate source
#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Units of `quote` per one unit of `base`
    async fn fetch_rate(&self, base: &str, quote: &str) -> WalletResult<f64>;
}
