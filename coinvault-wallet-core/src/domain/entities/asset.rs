//! Supported assets and their identifiers at each price provider

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssetInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub coingecko_id: &'static str,
    /// Display-only default used when every provider fails
    pub fallback_price: f64,
}

impl AssetInfo {
    /// Binance spot pair against USDT; USDT itself has none
    pub fn binance_pair(&self) -> Option<String> {
        if self.symbol == "USDT" {
            None
        } else {
            Some(format!("{}USDT", self.symbol))
        }
    }

    pub fn coinbase_pair(&self) -> String {
        format!("{}-USD", self.symbol)
    }
}

pub const SUPPORTED_ASSETS: &[AssetInfo] = &[
    AssetInfo { symbol: "BTC", name: "Bitcoin", coingecko_id: "bitcoin", fallback_price: 43250.0 },
    AssetInfo { symbol: "ETH", name: "Ethereum", coingecko_id: "ethereum", fallback_price: 2280.0 },
    AssetInfo { symbol: "USDT", name: "Tether", coingecko_id: "tether", fallback_price: 1.0 },
    AssetInfo { symbol: "BNB", name: "BNB", coingecko_id: "binancecoin", fallback_price: 315.0 },
    AssetInfo { symbol: "SOL", name: "Solana", coingecko_id: "solana", fallback_price: 98.0 },
    AssetInfo { symbol: "XRP", name: "Ripple", coingecko_id: "ripple", fallback_price: 0.52 },
    AssetInfo { symbol: "ADA", name: "Cardano", coingecko_id: "cardano", fallback_price: 0.45 },
    AssetInfo { symbol: "DOGE", name: "Dogecoin", coingecko_id: "dogecoin", fallback_price: 0.09 },
];

/// Case-insensitive symbol lookup
pub fn asset_by_symbol(symbol: &str) -> Option<&'static AssetInfo> {
    SUPPORTED_ASSETS
        .iter()
        .find(|asset| asset.symbol.eq_ignore_ascii_case(symbol))
}

pub fn asset_by_coingecko_id(id: &str) -> Option<&'static AssetInfo> {
    SUPPORTED_ASSETS.iter().find(|asset| asset.coingecko_id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(asset_by_symbol("eth").unwrap().coingecko_id, "ethereum");
        assert_eq!(asset_by_coingecko_id("binancecoin").unwrap().symbol, "BNB");
        assert!(asset_by_symbol("LTC").is_none());
    }

    #[test]
    fn test_provider_pairs() {
        let btc = asset_by_symbol("BTC").unwrap();
        assert_eq!(btc.binance_pair().as_deref(), Some("BTCUSDT"));
        assert_eq!(btc.coinbase_pair(), "BTC-USD");
        assert!(asset_by_symbol("USDT").unwrap().binance_pair().is_none());
    }
}
