//! Key generation and derivation
//!
//! This module contains key generation, mnemonic derivation and address
//! computation for the wallet core.

use super::{SecurePrivateKey, SecureSeedPhrase};
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::types::Address;
use crate::shared::utils::{keccak256, to_checksum_address};
use crate::shared::WalletResult;
use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use rand_core::{OsRng, RngCore};
use secp256k1::{PublicKey, Secp256k1};
use std::str::FromStr;
use zeroize::Zeroizing;

/// Key manager for cryptographic key operations
pub struct KeyManager {
    secp256k1: Secp256k1<secp256k1::All>,
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyManager {
    pub fn new() -> Self {
        Self {
            secp256k1: Secp256k1::new(),
        }
    }

    pub fn public_key(&self, private_key: &SecurePrivateKey) -> WalletResult<PublicKey> {
        let secret_key = private_key.secret_key()?;
        Ok(PublicKey::from_secret_key(&self.secp256k1, &secret_key))
    }

    /// Uncompressed public key as hex
    pub fn get_public_key(&self, private_key: &SecurePrivateKey) -> WalletResult<String> {
        Ok(hex::encode(self.public_key(private_key)?.serialize_uncompressed()))
    }

    /// EIP-55 checksummed address of a private key
    pub fn get_address(&self, private_key: &SecurePrivateKey) -> WalletResult<Address> {
        Ok(Self::address_from_public_key(&self.public_key(private_key)?))
    }

    pub fn address_from_public_key(public_key: &PublicKey) -> Address {
        // Drop the 0x04 prefix, hash, keep the last 20 bytes
        let public_key_bytes = public_key.serialize_uncompressed();
        let hash = keccak256(&public_key_bytes[1..]);
        to_checksum_address(&hash[12..])
    }

    /// Fresh 12-word English mnemonic
    pub fn generate_seed_phrase(&self) -> WalletResult<SecureSeedPhrase> {
        let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_SIZE]);
        OsRng.fill_bytes(&mut *entropy);
        let mnemonic = Mnemonic::from_entropy(&entropy[..])
            .map_err(|e| WalletError::crypto(format!("Failed to create mnemonic: {}", e)))?;
        Ok(SecureSeedPhrase::new(mnemonic.to_string()))
    }

    /// Validate and normalise user-entered words
    pub fn parse_seed_phrase(&self, phrase: &str) -> WalletResult<SecureSeedPhrase> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase.trim())
            .map_err(|e| WalletError::validation(format!("Invalid BIP39 seed phrase: {}", e)))?;
        Ok(SecureSeedPhrase::new(mnemonic.to_string()))
    }

    /// Derive the first Ethereum account key (`m/44'/60'/0'/0/0`) from a mnemonic
    pub fn derive_private_key_from_seed(&self, seed_phrase: &SecureSeedPhrase) -> WalletResult<SecurePrivateKey> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, seed_phrase.as_str())
            .map_err(|e| WalletError::validation(format!("Invalid BIP39 seed phrase: {}", e)))?;

        let seed = Zeroizing::new(mnemonic.to_seed_normalized("")); // No passphrase

        // Derive the BIP32 root key
        let xprv = XPrv::new(&seed[..])
            .map_err(|e| WalletError::crypto(format!("Failed to create XPrv: {}", e)))?;

        let derivation_path = DerivationPath::from_str(ETHEREUM_DERIVATION_PATH)
            .map_err(|e| WalletError::crypto(format!("Invalid derivation path: {}", e)))?;

        let mut child_xprv = xprv;
        for child_number in derivation_path.into_iter() {
            child_xprv = child_xprv
                .derive_child(child_number)
                .map_err(|e| WalletError::crypto(format!("Failed to derive child XPrv: {}", e)))?;
        }

        let mut private_key_bytes = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        private_key_bytes.copy_from_slice(&child_xprv.private_key().to_bytes());
        SecurePrivateKey::from_bytes(&private_key_bytes[..])
    }
}
