//! Error handling for the wallet core
//!
//! This module defines the error taxonomy used throughout the wallet core.
//! Callers branch on the variant: validation failures never touched the
//! network, auth failures should re-prompt for a passphrase, network and
//! server failures carry the remote message when one was provided.

use thiserror::Error;

/// Generic message used when a remote service fails without saying why
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed. Please try again.";

/// Wallet error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Server rejected request: {0}")]
    ServerRejected(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("No private key available: {0}")]
    MissingKey(String),

    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a cryptographic error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a transport-level network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkUnavailable(message.into())
    }

    /// Create a server rejection, falling back to a generic message
    pub fn server_rejected(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        Self::ServerRejected(message)
    }

    /// Create an authentication failure
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a missing key error (watch-only account)
    pub fn missing_key(message: impl Into<String>) -> Self {
        Self::MissingKey(message.into())
    }

    /// Create a broadcast failure carrying the remote message verbatim
    pub fn broadcast(message: impl Into<String>) -> Self {
        Self::Broadcast(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Auth-class failures: the caller should re-prompt rather than retry the network
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::MissingKey(_))
    }

    pub fn is_network_unavailable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The message without the category prefix, suitable for surfacing to a user
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m)
            | Self::Crypto(m)
            | Self::Validation(m)
            | Self::Storage(m)
            | Self::NetworkUnavailable(m)
            | Self::ServerRejected(m)
            | Self::Auth(m)
            | Self::MissingKey(m)
            | Self::Broadcast(m)
            | Self::Internal(m) => m,
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(format!("IO error: {}", err))
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(err: hex::FromHexError) -> Self {
        Self::validation(format!("Hex decoding error: {}", err))
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for WalletError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

// HTTP transport conversions
impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::server_rejected(Some(format!("Invalid response body: {}", err)))
        } else {
            Self::network(format!("Cannot connect to server: {}", err))
        }
    }
}

// Cryptographic error conversions
impl From<secp256k1::Error> for WalletError {
    fn from(err: secp256k1::Error) -> Self {
        Self::crypto(format!("Secp256k1 error: {}", err))
    }
}

impl From<argon2::Error> for WalletError {
    fn from(err: argon2::Error) -> Self {
        Self::crypto(format!("Argon2 error: {}", err))
    }
}

impl From<aes_gcm::Error> for WalletError {
    fn from(err: aes_gcm::Error) -> Self {
        Self::crypto(format!("AEAD error: {}", err))
    }
}

impl From<openssl::error::ErrorStack> for WalletError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        Self::crypto(format!("OpenSSL error: {}", err))
    }
}

impl From<config::ConfigError> for WalletError {
    fn from(err: config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}
