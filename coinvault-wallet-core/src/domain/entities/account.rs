//! Account entity and import classification

use crate::core::crypto::keys::SecureSeedPhrase;
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::types::{Address, EncryptedKey};
use crate::shared::utils::checksum_address;
use crate::shared::WalletResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// A wallet account known to the client
///
/// The address never changes after construction. A watch-only account has no
/// encrypted private key and cannot sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_private_key: Option<EncryptedKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_mnemonic: Option<EncryptedKey>,
    created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(address: &str, encrypted_private_key: Option<EncryptedKey>) -> WalletResult<Self> {
        Ok(Self {
            address: checksum_address(address)?,
            encrypted_private_key: encrypted_private_key.filter(|key| !key.is_empty()),
            encrypted_mnemonic: None,
            created_at: Utc::now(),
        })
    }

    pub fn watch_only(address: &str) -> WalletResult<Self> {
        Self::new(address, None)
    }

    pub fn with_encrypted_mnemonic(mut self, encrypted_mnemonic: EncryptedKey) -> Self {
        self.encrypted_mnemonic = Some(encrypted_mnemonic);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn encrypted_private_key(&self) -> Option<&str> {
        self.encrypted_private_key.as_deref()
    }

    pub fn encrypted_mnemonic(&self) -> Option<&str> {
        self.encrypted_mnemonic.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_watch_only(&self) -> bool {
        self.encrypted_private_key.is_none()
    }
}

/// Result of account creation: the account plus its mnemonic, shown once
#[derive(Debug)]
pub struct CreatedAccount {
    pub account: Account,
    pub seed_phrase: SecureSeedPhrase,
}

/// What the user pasted into the import field
pub enum ImportInput {
    /// 64 hex digits, `0x` prefix already stripped
    PrivateKey(Zeroizing<String>),
    WatchOnly(Address),
}

impl ImportInput {
    /// Classify by length and shape alone; nothing is derived here
    ///
    /// | length | shape            | result      |
    /// |--------|------------------|-------------|
    /// | 66     | `0x` + 64 hex    | private key |
    /// | 64     | 64 hex           | private key |
    /// | 42     | `0x` + 40 hex    | watch-only  |
    pub fn classify(input: &str) -> WalletResult<Self> {
        let input = input.trim();
        let is_hex = |s: &str| s.chars().all(|c| c.is_ascii_hexdigit());

        match input.len() {
            PREFIXED_PRIVATE_KEY_LENGTH if input.starts_with("0x") && is_hex(&input[2..]) => {
                Ok(Self::PrivateKey(Zeroizing::new(input[2..].to_string())))
            }
            PRIVATE_KEY_HEX_LENGTH if is_hex(input) => {
                Ok(Self::PrivateKey(Zeroizing::new(input.to_string())))
            }
            ADDRESS_LENGTH if input.starts_with("0x") && is_hex(&input[2..]) => {
                Ok(Self::WatchOnly(input.to_string()))
            }
            PREFIXED_PRIVATE_KEY_LENGTH | PRIVATE_KEY_HEX_LENGTH | ADDRESS_LENGTH => Err(
                WalletError::validation("Input has the length of a key or address but is not valid hex"),
            ),
            len => Err(WalletError::validation(format!(
                "Expected a 64-hex-digit private key or a 0x address, got {} characters",
                len
            ))),
        }
    }

    pub fn is_private_key(&self) -> bool {
        matches!(self, Self::PrivateKey(_))
    }
}

impl fmt::Debug for ImportInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateKey(_) => f.write_str("PrivateKey([REDACTED])"),
            Self::WatchOnly(address) => f.debug_tuple("WatchOnly").field(address).finish(),
        }
    }
}
