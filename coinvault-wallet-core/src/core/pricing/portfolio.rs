use super::price_feed::PriceTable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of the CoinGecko `coins/markets` listing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketStats {
    pub total_market_cap: f64,
    pub total_volume: f64,
    /// Percentage of the listed market cap held by BTC
    pub btc_dominance: f64,
}

impl MarketStats {
    pub fn from_entries(entries: &[MarketEntry]) -> Self {
        let total_market_cap: f64 = entries.iter().filter_map(|e| e.market_cap).sum();
        let total_volume: f64 = entries.iter().filter_map(|e| e.total_volume).sum();
        let btc_cap = entries
            .iter()
            .find(|e| e.symbol.eq_ignore_ascii_case("btc"))
            .and_then(|e| e.market_cap)
            .unwrap_or(0.0);

        let btc_dominance = if total_market_cap > 0.0 {
            btc_cap / total_market_cap * 100.0
        } else {
            0.0
        };

        Self {
            total_market_cap,
            total_volume,
            btc_dominance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSort {
    MarketCap,
    Price,
    Change24h,
    Volume,
}

fn by_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(f64::NEG_INFINITY);
    let b = b.unwrap_or(f64::NEG_INFINITY);
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

impl MarketSort {
    /// Descending; entries missing the field sort last
    pub fn sort(self, entries: &mut [MarketEntry]) {
        entries.sort_by(|a, b| match self {
            Self::MarketCap => by_desc(a.market_cap, b.market_cap),
            Self::Price => by_desc(a.current_price, b.current_price),
            Self::Change24h => by_desc(a.price_change_percentage_24h, b.price_change_percentage_24h),
            Self::Volume => by_desc(a.total_volume, b.total_volume),
        });
    }
}

/// Case-insensitive match on name or symbol; an empty query keeps everything
pub fn filter_markets<'a>(entries: &'a [MarketEntry], query: &str) -> Vec<&'a MarketEntry> {
    let query = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| query.is_empty() || e.name.to_lowercase().contains(&query) || e.symbol.to_lowercase().contains(&query))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub balance: f64,
}

impl Holding {
    pub fn new(symbol: &str, balance: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioLine {
    pub symbol: String,
    pub balance: f64,
    pub usd_price: f64,
    pub usd_value: f64,
    pub fallback_price: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Portfolio {
    pub lines: Vec<PortfolioLine>,
    pub total_usd: f64,
    /// Held symbols with no price at all
    pub unpriced: Vec<String>,
}

impl Portfolio {
    pub fn uses_fallback(&self) -> bool {
        self.lines.iter().any(|line| line.fallback_price)
    }
}

/// Value each holding with a positive balance at `balance × price`
pub fn value_portfolio(holdings: &[Holding], prices: &PriceTable) -> Portfolio {
    let mut portfolio = Portfolio::default();

    for holding in holdings.iter().filter(|h| h.balance > 0.0) {
        match prices.get(&holding.symbol) {
            Some(quote) => {
                let usd_value = holding.balance * quote.usd;
                portfolio.total_usd += usd_value;
                portfolio.lines.push(PortfolioLine {
                    symbol: holding.symbol.clone(),
                    balance: holding.balance,
                    usd_price: quote.usd,
                    usd_value,
                    fallback_price: quote.source.is_fallback(),
                });
            }
            None => {
                log::debug!("No price for held asset {}", holding.symbol);
                portfolio.unpriced.push(holding.symbol.clone());
            }
        }
    }

    portfolio
}
