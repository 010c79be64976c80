//! Per-session client state
//!
//! One `Session` per signed-in user. It owns the bearer token, the cached
//! user, the last price table and exchange rate, and the accounts created or
//! imported during the session. Every mutation takes `&mut self`.

use crate::core::pricing::{ExchangeRate, ExchangeRateService, FallbackPolicy, FetchOutcome, PriceFeed, PriceTable};
use crate::domain::entities::{Account, AssetInfo};
use crate::domain::repositories::{AuthService, LoginRequest, RegisterRequest, SessionStorage};
use crate::shared::constants::{TOKEN_STORAGE_KEY, USER_STORAGE_KEY};
use crate::shared::error::WalletError;
use crate::shared::types::{AuthSession, User};
use crate::shared::utils::same_address;
use crate::shared::WalletResult;
use std::sync::Arc;

pub struct Session {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn SessionStorage>,
    price_feed: PriceFeed,
    fallback: FallbackPolicy,
    rates: ExchangeRateService,
    token: Option<String>,
    user: Option<User>,
    prices: PriceTable,
    last_fetch: Option<FetchOutcome>,
    exchange_rate: Option<ExchangeRate>,
    accounts: Vec<Account>,
}

impl Session {
    pub fn new(
        auth: Arc<dyn AuthService>,
        storage: Arc<dyn SessionStorage>,
        price_feed: PriceFeed,
        fallback: FallbackPolicy,
        rates: ExchangeRateService,
    ) -> Self {
        Self {
            auth,
            storage,
            price_feed,
            fallback,
            rates,
            token: None,
            user: None,
            prices: PriceTable::default(),
            last_fetch: None,
            exchange_rate: None,
            accounts: Vec::new(),
        }
    }

    /// Pick up a token and user persisted by an earlier login
    ///
    /// Returns whether a token was found. An unreadable stored user is dropped;
    /// the token alone still counts.
    pub fn restore(&mut self) -> WalletResult<bool> {
        let Some(token) = self.storage.get(TOKEN_STORAGE_KEY)?.filter(|t| !t.is_empty()) else {
            return Ok(false);
        };

        self.user = match self.storage.get(USER_STORAGE_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("Discarding unreadable stored user: {}", e);
                    self.storage.remove(USER_STORAGE_KEY)?;
                    None
                }
            },
            None => None,
        };
        self.auth.use_token(Some(&token));
        self.token = Some(token);
        log::debug!("Restored session");
        Ok(true)
    }

    /// Re-check the token with the server; an auth failure ends the session
    pub async fn verify(&mut self) -> WalletResult<&User> {
        let token = self.require_token()?.to_string();
        let checked = self.auth.me(&token).await;
        match checked {
            Ok(user) => {
                self.storage.set(USER_STORAGE_KEY, &serde_json::to_string(&user)?)?;
                Ok(&*self.user.insert(user))
            }
            Err(e) if e.is_auth_failure() || matches!(e, WalletError::ServerRejected(_)) => {
                log::info!("Stored session no longer valid");
                self.logout()?;
                Err(WalletError::auth("Session expired. Please sign in again"))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> WalletResult<&User> {
        let request = LoginRequest::new(email, password)?;
        let session = self.auth.login(&request).await?;
        self.establish(session)
    }

    pub async fn register(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> WalletResult<&User> {
        let request = RegisterRequest::new(full_name, email, password, confirm_password)?;
        let session = self.auth.register(&request).await?;
        self.establish(session)
    }

    fn establish(&mut self, session: AuthSession) -> WalletResult<&User> {
        if session.token.is_empty() {
            return Err(WalletError::server_rejected(Some("Server returned no token".to_string())));
        }
        self.storage.set(TOKEN_STORAGE_KEY, &session.token)?;
        self.storage.set(USER_STORAGE_KEY, &serde_json::to_string(&session.user)?)?;
        self.auth.use_token(Some(&session.token));
        self.token = Some(session.token);
        Ok(&*self.user.insert(session.user))
    }

    /// Forget token, user and account cache, locally and in storage
    pub fn logout(&mut self) -> WalletResult<()> {
        self.storage.remove(TOKEN_STORAGE_KEY)?;
        self.storage.remove(USER_STORAGE_KEY)?;
        self.auth.use_token(None);
        self.token = None;
        self.user = None;
        self.accounts.clear();
        log::info!("Signed out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn require_token(&self) -> WalletResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| WalletError::auth("Please sign in first"))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Fetch, then apply the fallback defaults for anything still unpriced
    pub async fn refresh_prices(&mut self, assets: &[AssetInfo]) -> &PriceTable {
        let outcome = self.price_feed.fetch(assets).await;
        self.prices = self.fallback.apply(&outcome, assets);
        self.last_fetch = Some(outcome);
        &self.prices
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Provider attempts of the most recent price refresh
    pub fn last_fetch(&self) -> Option<&FetchOutcome> {
        self.last_fetch.as_ref()
    }

    pub async fn refresh_exchange_rate(&mut self) -> WalletResult<&ExchangeRate> {
        let rate = self.rates.current(self.storage.as_ref()).await?;
        Ok(&*self.exchange_rate.insert(rate))
    }

    pub fn exchange_rate(&self) -> Option<&ExchangeRate> {
        self.exchange_rate.as_ref()
    }

    /// Remember an account; a second copy of the same address replaces the first
    pub fn remember_account(&mut self, account: Account) {
        self.accounts
            .retain(|known| !same_address(known.address(), account.address()));
        self.accounts.push(account);
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, address: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| same_address(account.address(), address))
    }
}
