//! Wallet configuration
//!
//! Values are layered: built-in defaults, then an optional `coinvault.toml`,
//! then `COINVAULT_*` environment variables (a `.env` file is loaded first).
//! Nested keys use a double underscore, e.g. `COINVAULT_KDF__ALGORITHM=pbkdf2`.

use crate::core::crypto::encryption::{EncryptionAlgorithm, PassphraseCipher};
use crate::core::crypto::password::PasswordConfig;
use crate::domain::entities::SUPPORTED_ASSETS;
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "coinvault.toml";
pub const ENV_PREFIX: &str = "COINVAULT";

/// Where signed transactions are submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastTarget {
    /// Backend `POST /wallet/broadcast`
    #[default]
    Registry,
    /// The chain node via `eth_sendRawTransaction`
    Node,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub api_url: String,
    pub rpc_url: String,
    pub chain_id: u64,
    pub request_timeout_secs: u64,
    pub send_timeout_secs: u64,
    pub broadcast_via: BroadcastTarget,
    pub log_level: String,
    /// Directory holding the session file; the platform data dir when unset
    pub session_dir: Option<PathBuf>,
    pub local_currency: String,
    pub exchange_rate_ttl_hours: i64,
    pub default_exchange_rate: f64,
    /// Display-only USD prices used when every price provider fails
    pub default_prices: HashMap<String, f64>,
    pub kdf: PasswordConfig,
    pub cipher: EncryptionAlgorithm,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            send_timeout_secs: DEFAULT_SEND_TIMEOUT_SECS,
            broadcast_via: BroadcastTarget::Registry,
            log_level: "info".to_string(),
            session_dir: None,
            local_currency: DEFAULT_LOCAL_CURRENCY.to_string(),
            exchange_rate_ttl_hours: EXCHANGE_RATE_TTL_HOURS,
            default_exchange_rate: DEFAULT_EXCHANGE_RATE,
            default_prices: SUPPORTED_ASSETS
                .iter()
                .map(|asset| (asset.symbol.to_string(), asset.fallback_price))
                .collect(),
            kdf: PasswordConfig::default(),
            cipher: EncryptionAlgorithm::AES256GCM,
        }
    }
}

impl WalletConfig {
    /// Load from `.env`, `coinvault.toml` in the working directory and the environment
    pub fn load() -> WalletResult<Self> {
        dotenv::dotenv().ok();
        let file = std::env::var(format!("{}_CONFIG_FILE", ENV_PREFIX))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));
        Self::load_from(Some(&file))
    }

    /// Load with an explicit (optional, possibly missing) config file
    pub fn load_from(file: Option<&Path>) -> WalletResult<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = file {
            log::debug!("Reading configuration file {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: WalletConfig = builder.build()?.try_deserialize()?;
        config.default_prices = config
            .default_prices
            .into_iter()
            .map(|(symbol, price)| (symbol.to_uppercase(), price))
            .collect();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WalletResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(WalletError::config("api_url is required and cannot be empty"));
        }
        if self.rpc_url.trim().is_empty() {
            return Err(WalletError::config("rpc_url is required and cannot be empty"));
        }
        if self.chain_id == 0 {
            return Err(WalletError::config("chain_id must be greater than zero"));
        }
        if self.request_timeout_secs == 0 || self.send_timeout_secs == 0 {
            return Err(WalletError::config("Timeouts must be greater than zero"));
        }
        if self.exchange_rate_ttl_hours <= 0 {
            return Err(WalletError::config("exchange_rate_ttl_hours must be positive"));
        }
        if !(self.default_exchange_rate > 0.0) {
            return Err(WalletError::config("default_exchange_rate must be positive"));
        }
        if let Some((symbol, _)) = self.default_prices.iter().find(|(_, price)| !(**price >= 0.0)) {
            return Err(WalletError::config(format!("Invalid default price for {}", symbol)));
        }
        self.kdf.validate()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Session directory, falling back to `<data dir>/coinvault`
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
        })
    }

    pub fn session_file(&self) -> PathBuf {
        self.session_dir().join(SESSION_FILE_NAME)
    }

    pub fn cipher(&self) -> PassphraseCipher {
        PassphraseCipher::new(self.kdf, self.cipher)
    }

    /// Summary safe to print; holds no secrets
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "api_url": self.api_url,
            "rpc_url": self.rpc_url,
            "chain_id": self.chain_id,
            "request_timeout_secs": self.request_timeout_secs,
            "send_timeout_secs": self.send_timeout_secs,
            "broadcast_via": self.broadcast_via,
            "log_level": self.log_level,
            "session_file": self.session_file().display().to_string(),
            "local_currency": self.local_currency,
            "exchange_rate_ttl_hours": self.exchange_rate_ttl_hours,
            "default_exchange_rate": self.default_exchange_rate,
            "kdf": format!("{} ({})", self.kdf.algorithm, self.kdf.encode_params()),
            "cipher": self.cipher.as_str(),
        })
    }
}
