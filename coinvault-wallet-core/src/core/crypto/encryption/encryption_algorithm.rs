use crate::shared::error::WalletError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Encryption algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionAlgorithm {
    #[serde(rename = "aes-256-gcm")]
    AES256GCM,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl EncryptionAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AES256GCM => "aes-256-gcm",
            Self::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }
}

impl FromStr for EncryptionAlgorithm {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aes-256-gcm" => Ok(Self::AES256GCM),
            "chacha20-poly1305" => Ok(Self::ChaCha20Poly1305),
            other => Err(WalletError::crypto(format!("Unsupported cipher: {}", other))),
        }
    }
}
