//! Market data for display
//!
//! Price providers with an explicit fallback step, the cached USD to local
//! currency rate, swap and buy quotes, and portfolio valuation. None of these
//! numbers feed the transaction pipeline.

pub mod exchange_rate;
pub mod portfolio;
pub mod price_feed;
pub mod providers;
pub mod quotes;

pub use exchange_rate::{CachedRate, ExchangeRate, ExchangeRateService, RateSource};
pub use portfolio::{filter_markets, value_portfolio, Holding, MarketEntry, MarketSort, MarketStats, Portfolio, PortfolioLine};
pub use price_feed::{FallbackPolicy, FetchOutcome, PriceFeed, PriceQuote, PriceSource, PriceTable, ProviderAttempt};
pub use providers::{
    default_price_providers, default_rate_providers, http_client, BinanceProvider, CoinGeckoProvider,
    CoinbaseProvider, CryptoCompareProvider, ExchangeRateHostProvider, OpenErApiProvider,
};
pub use quotes::{BuyCalculator, BuyQuote, LocalAmount, LocalCurrencyHook, PostCalculationHook, SwapQuote};
