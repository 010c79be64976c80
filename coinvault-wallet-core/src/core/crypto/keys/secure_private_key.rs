use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use rand_core::{OsRng, RngCore};
use secp256k1::SecretKey;
use zeroize::Zeroizing;

/// Plaintext private key held in zeroizing memory
///
/// Exists only between decrypt and sign (or between generation and
/// encryption). Consumed by signing so it cannot outlive the call.
pub struct SecurePrivateKey {
    bytes: Zeroizing<[u8; PRIVATE_KEY_SIZE]>,
}

impl SecurePrivateKey {
    /// Generate a new private key
    /// Uses cryptographically secure random number generation
    pub fn generate() -> WalletResult<Self> {
        let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        // Out-of-range scalars are astronomically rare; draw again if one shows up
        for _ in 0..8 {
            OsRng.fill_bytes(&mut *bytes);
            if SecretKey::from_byte_array(*bytes).is_ok() {
                return Ok(Self { bytes });
            }
        }
        Err(WalletError::crypto("Generated invalid private key"))
    }

    /// Wrap existing key bytes; the caller's buffer is left to its owner to wipe
    pub fn from_bytes(bytes: &[u8]) -> WalletResult<Self> {
        let array: [u8; PRIVATE_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| WalletError::validation("Invalid private key length"))?;
        let bytes = Zeroizing::new(array);
        SecretKey::from_byte_array(*bytes)
            .map_err(|_| WalletError::validation("Invalid private key"))?;
        Ok(Self { bytes })
    }

    /// Parse a 64-hex-digit key with or without the `0x` prefix
    pub fn from_hex(hex_key: &str) -> WalletResult<Self> {
        let clean = hex_key.trim().trim_start_matches("0x");
        if clean.len() != PRIVATE_KEY_HEX_LENGTH {
            return Err(WalletError::validation("Private key must be 64 hex characters"));
        }
        let decoded = Zeroizing::new(
            hex::decode(clean).map_err(|_| WalletError::validation("Invalid private key format"))?,
        );
        Self::from_bytes(&decoded)
    }

    /// Perform cryptographic operations without copying the key out
    pub fn with_key<F, T>(&self, f: F) -> WalletResult<T>
    where
        F: FnOnce(&[u8; PRIVATE_KEY_SIZE]) -> WalletResult<T>,
    {
        f(&self.bytes)
    }

    pub fn secret_key(&self) -> WalletResult<SecretKey> {
        Ok(SecretKey::from_byte_array(*self.bytes)?)
    }

    /// `0x`-prefixed hex, the form that gets passphrase-encrypted
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("0x{}", hex::encode(&self.bytes[..])))
    }
}

// No Debug implementation to prevent key exposure in logs
// No Clone implementation to prevent accidental key duplication
