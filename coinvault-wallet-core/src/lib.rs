//! CoinVault Wallet Core
//!
//! Client-side wallet for CoinVault.
//! Handles passphrase encryption, key material, transaction assembly, signing
//! and submission, plus the market data and session state around them.
//!
//! ## Architecture
//!
//! - **Core**: crypto, accounts, transaction pipeline, pricing, session
//! - **Domain**: entities and the traits every remote service sits behind
//! - **Infrastructure**: HTTP API client, chain RPC client, config, logging, storage
//! - **Shared**: common types, constants, errors and utilities
//!
//! ## Security
//!
//! - A plaintext private key only lives inside one send, in zeroizing memory
//! - Passphrases are never stored or logged
//! - Wrong passphrases are detected by authenticated encryption
//!
//! ## Usage
//!
//! ```rust,no_run
//! use coinvault_wallet_core::{WalletConfig, WalletCore};
//!
//! # async fn demo() -> Result<(), coinvault_wallet_core::WalletError> {
//! let core = WalletCore::from_config(WalletConfig::load()?)?;
//! let mut session = core.new_session();
//! session.login("ama@example.com", "secret1").await?;
//!
//! let created = core.accounts().create_account("correct horse battery").await?;
//! let outcome = core
//!     .pipeline()
//!     .send(created.account.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94", "0.01", "correct horse battery")
//!     .await;
//! println!("send ended in {}", outcome.final_state());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod shared;

#[cfg(test)]
mod testing;

use crate::core::pricing::{
    default_price_providers, default_rate_providers, http_client, CoinGeckoProvider, ExchangeRateService,
    FallbackPolicy, PriceFeed,
};
use crate::core::session::Session;
use crate::core::transactions::{SendPipeline, SubmissionRelay, TransactionBuilder, TransactionSigner};
use crate::core::wallet::AccountManager;
use crate::domain::repositories::{Broadcaster, ChainClient, SessionStorage};
use crate::shared::utils::format_ether_amount;
use std::sync::Arc;

// Re-export specific components
pub use crate::core::crypto::{KeyManager, PassphraseCipher};
pub use crate::core::pricing::{PriceTable, SwapQuote};
pub use crate::core::transactions::{SendOutcome, SendState};
pub use crate::domain::entities::{Account, CreatedAccount, SUPPORTED_ASSETS};
pub use crate::infrastructure::{ApiClient, BroadcastTarget, FileSessionStorage, RpcClient, WalletConfig};
pub use crate::shared::error::WalletError;
pub use crate::shared::types::{Balance, BroadcastReceipt, SignedTransaction, TransactionHash, UnsignedTransaction};
pub use crate::shared::WalletResult;

// Version information
pub use crate::shared::constants::{DESCRIPTION, NAME, VERSION};

/// Everything a client needs, wired from one [`WalletConfig`]
pub struct WalletCore {
    config: WalletConfig,
    api: Arc<ApiClient>,
    rpc: Arc<RpcClient>,
    storage: Arc<dyn SessionStorage>,
    http: reqwest::Client,
    accounts: AccountManager,
    pipeline: SendPipeline,
}

impl WalletCore {
    /// Session state goes to the configured session file
    pub fn from_config(config: WalletConfig) -> WalletResult<Self> {
        let storage = Arc::new(FileSessionStorage::new(config.session_file()));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: WalletConfig, storage: Arc<dyn SessionStorage>) -> WalletResult<Self> {
        config.validate()?;
        let timeout = config.request_timeout();
        let api = Arc::new(ApiClient::new(config.api_url.as_str(), timeout)?);
        let rpc = Arc::new(RpcClient::new(config.rpc_url.as_str(), timeout)?);
        let http = http_client(timeout)?;
        let cipher = config.cipher();

        let broadcaster: Arc<dyn Broadcaster> = match config.broadcast_via {
            BroadcastTarget::Registry => api.clone(),
            BroadcastTarget::Node => rpc.clone(),
        };
        let pipeline = SendPipeline::new(
            api.clone(),
            TransactionBuilder::new(rpc.clone(), config.chain_id),
            TransactionSigner::new(cipher),
            SubmissionRelay::new(broadcaster),
        );
        let accounts = AccountManager::new(api.clone(), cipher);

        log::info!(
            "Wallet core ready: api {}, chain {} via {}, broadcasting through {}",
            config.api_url,
            config.chain_id,
            config.rpc_url,
            pipeline.broadcaster_name()
        );

        Ok(Self {
            config,
            api,
            rpc,
            storage,
            http,
            accounts,
            pipeline,
        })
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn accounts(&self) -> &AccountManager {
        &self.accounts
    }

    pub fn pipeline(&self) -> &SendPipeline {
        &self.pipeline
    }

    pub fn storage(&self) -> Arc<dyn SessionStorage> {
        self.storage.clone()
    }

    /// Fresh session over the shared storage; call [`Session::restore`] to pick up a login
    pub fn new_session(&self) -> Session {
        Session::new(
            self.api.clone(),
            self.storage.clone(),
            PriceFeed::new(default_price_providers(&self.http)),
            FallbackPolicy::new(self.config.default_prices.clone()),
            ExchangeRateService::new(
                default_rate_providers(&self.http),
                &self.config.local_currency,
                self.config.exchange_rate_ttl_hours,
                self.config.default_exchange_rate,
            ),
        )
    }

    /// CoinGecko client for the market listing
    pub fn markets(&self) -> CoinGeckoProvider {
        CoinGeckoProvider::new(self.http.clone())
    }

    /// On-chain balance in ether, straight from the node
    pub async fn chain_balance(&self, address: &str) -> WalletResult<String> {
        let address = shared::utils::checksum_address(address)?;
        let wei = self.rpc.balance(&address).await?;
        Ok(format_ether_amount(wei))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStorage;

    #[test]
    fn test_wallet_core_wiring() {
        let core = WalletCore::with_storage(WalletConfig::default(), Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(core.api().base_url(), "http://localhost:5000/api");
        assert_eq!(core.pipeline().broadcaster_name(), "registry");

        let session = core.new_session();
        assert!(!session.is_authenticated());
        assert!(session.prices().is_empty());
    }

    #[test]
    fn test_node_broadcast_target() {
        let config = WalletConfig {
            broadcast_via: BroadcastTarget::Node,
            ..WalletConfig::default()
        };
        let core = WalletCore::with_storage(config, Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(core.pipeline().broadcaster_name(), "node");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WalletConfig {
            api_url: " ".to_string(),
            ..WalletConfig::default()
        };
        assert!(WalletCore::with_storage(config, Arc::new(MemoryStorage::new())).is_err());
    }

    #[tokio::test]
    async fn test_chain_balance_validates_address_first() {
        let core = WalletCore::with_storage(WalletConfig::default(), Arc::new(MemoryStorage::new())).unwrap();
        assert!(core.chain_balance("0x1234").await.unwrap_err().is_validation());
    }
}
