//! Swap and buy quotes over a price table
//!
//! Quotes are display figures; nothing here moves funds.

use super::exchange_rate::ExchangeRate;
use super::price_feed::PriceTable;
use crate::shared::constants::SWAP_FEE_RATE;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use serde::Serialize;

fn usd_price(prices: &PriceTable, symbol: &str) -> WalletResult<f64> {
    prices
        .price(symbol)
        .filter(|price| *price > 0.0)
        .ok_or_else(|| WalletError::validation(format!("No price available for {}", symbol.to_uppercase())))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapQuote {
    pub from_symbol: String,
    pub to_symbol: String,
    pub from_amount: f64,
    /// Units of `to` per unit of `from`
    pub rate: f64,
    pub fee: f64,
    pub receive_amount: f64,
}

impl SwapQuote {
    /// Convert at `from_price / to_price`, less a 0.3 % fee taken in the target asset
    pub fn calculate(
        from_symbol: &str,
        to_symbol: &str,
        from_amount: f64,
        available_balance: f64,
        prices: &PriceTable,
    ) -> WalletResult<Self> {
        if !from_amount.is_finite() || from_amount <= 0.0 {
            return Err(WalletError::validation("Enter amount"));
        }
        if from_symbol.eq_ignore_ascii_case(to_symbol) {
            return Err(WalletError::validation("Choose two different assets"));
        }
        if from_amount > available_balance {
            return Err(WalletError::validation("Insufficient balance"));
        }

        let from_price = usd_price(prices, from_symbol)?;
        let to_price = usd_price(prices, to_symbol)?;

        let gross = from_amount * from_price / to_price;
        let fee = gross * SWAP_FEE_RATE;
        Ok(Self {
            from_symbol: from_symbol.to_uppercase(),
            to_symbol: to_symbol.to_uppercase(),
            from_amount,
            rate: from_price / to_price,
            fee,
            receive_amount: gross - fee,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalAmount {
    pub currency: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyQuote {
    pub symbol: String,
    pub usd_amount: f64,
    pub usd_price: f64,
    pub crypto_amount: f64,
    /// Set by [`LocalCurrencyHook`] when a rate is known
    pub local: Option<LocalAmount>,
}

/// Runs after the base buy calculation and may enrich the quote
pub trait PostCalculationHook: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, quote: &mut BuyQuote);
}

/// Adds the local-currency amount a mobile-money payment would need
pub struct LocalCurrencyHook {
    rate: ExchangeRate,
}

impl LocalCurrencyHook {
    pub fn new(rate: ExchangeRate) -> Self {
        Self { rate }
    }
}

impl PostCalculationHook for LocalCurrencyHook {
    fn name(&self) -> &str {
        "local-currency"
    }

    fn apply(&self, quote: &mut BuyQuote) {
        if quote.usd_amount > 0.0 && self.rate.rate > 0.0 {
            quote.local = Some(LocalAmount {
                currency: self.rate.quote.clone(),
                amount: self.rate.convert(quote.usd_amount),
            });
        } else {
            quote.local = None;
        }
    }
}

/// Buy calculation with hooks run in registration order
#[derive(Default)]
pub struct BuyCalculator {
    hooks: Vec<Box<dyn PostCalculationHook>>,
}

impl BuyCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Box<dyn PostCalculationHook>) -> &mut Self {
        log::debug!("Registered buy hook {}", hook.name());
        self.hooks.push(hook);
        self
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn calculate(&self, symbol: &str, usd_amount: f64, prices: &PriceTable) -> WalletResult<BuyQuote> {
        if !usd_amount.is_finite() || usd_amount < 0.0 {
            return Err(WalletError::validation("Enter a valid amount"));
        }
        let usd_price = usd_price(prices, symbol)?;

        let mut quote = BuyQuote {
            symbol: symbol.to_uppercase(),
            usd_amount,
            usd_price,
            crypto_amount: usd_amount / usd_price,
            local: None,
        };
        for hook in &self.hooks {
            hook.apply(&mut quote);
        }
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pricing::exchange_rate::RateSource;
    use crate::core::pricing::price_feed::{PriceQuote, PriceSource};
    use std::sync::{Arc, Mutex};

    fn table() -> PriceTable {
        let mut table = PriceTable::default();
        for (symbol, usd) in [("BTC", 43250.0), ("ETH", 2280.0), ("USDT", 1.0)] {
            table.insert(
                symbol,
                PriceQuote {
                    usd,
                    source: PriceSource::Fallback,
                },
            );
        }
        table
    }

    fn ghs(rate: f64) -> ExchangeRate {
        ExchangeRate {
            base: "USD".to_string(),
            quote: "GHS".to_string(),
            rate,
            source: RateSource::Fallback,
        }
    }

    #[test]
    fn test_swap_applies_fee() {
        let quote = SwapQuote::calculate("eth", "USDT", 2.0, 5.0, &table()).unwrap();
        assert_eq!(quote.rate, 2280.0);
        assert!((quote.fee - 13.68).abs() < 1e-9);
        assert!((quote.receive_amount - 4546.32).abs() < 1e-9);
        assert_eq!(quote.from_symbol, "ETH");
    }

    #[test]
    fn test_swap_rejections() {
        let prices = table();
        assert_eq!(
            SwapQuote::calculate("ETH", "BTC", 0.0, 1.0, &prices).unwrap_err().message(),
            "Enter amount"
        );
        assert_eq!(
            SwapQuote::calculate("ETH", "BTC", 2.0, 1.0, &prices).unwrap_err().message(),
            "Insufficient balance"
        );
        assert!(SwapQuote::calculate("ETH", "eth", 1.0, 1.0, &prices).is_err());
        assert!(SwapQuote::calculate("ETH", "SOL", 1.0, 1.0, &prices).is_err());
    }

    #[test]
    fn test_buy_without_hooks() {
        let quote = BuyCalculator::new().calculate("BTC", 86.5, &table()).unwrap();
        assert!((quote.crypto_amount - 0.002).abs() < 1e-12);
        assert_eq!(quote.local, None);
    }

    #[test]
    fn test_local_currency_hook() {
        let mut calculator = BuyCalculator::new();
        calculator.register(Box::new(LocalCurrencyHook::new(ghs(15.0))));

        let quote = calculator.calculate("USDT", 100.0, &table()).unwrap();
        assert_eq!(
            quote.local,
            Some(LocalAmount {
                currency: "GHS".to_string(),
                amount: 1500.0
            })
        );

        let empty = calculator.calculate("USDT", 0.0, &table()).unwrap();
        assert_eq!(empty.local, None);
    }

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl PostCalculationHook for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn apply(&self, _quote: &mut BuyQuote) {
            self.log.lock().unwrap().push(self.label);
        }
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut calculator = BuyCalculator::new();
        calculator
            .register(Box::new(Recorder { label: "first", log: log.clone() }))
            .register(Box::new(Recorder { label: "second", log: log.clone() }))
            .register(Box::new(Recorder { label: "third", log: log.clone() }));

        calculator.calculate("ETH", 50.0, &table()).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(calculator.hook_names(), vec!["first", "second", "third"]);
    }
}
