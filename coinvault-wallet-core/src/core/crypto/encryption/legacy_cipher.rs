//! Ciphertexts written by the browser wallet
//!
//! The browser stored keys in the CryptoJS passphrase format: base64 of
//! `Salted__`, an 8-byte salt and AES-256-CBC ciphertext, with key and IV
//! derived by OpenSSL's `EVP_BytesToKey` (MD5, one round).

use crate::shared::constants::{LEGACY_CIPHERTEXT_PREFIX, LEGACY_SALT_HEADER, LEGACY_SALT_SIZE};
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use openssl::hash::MessageDigest;
use openssl::pkcs5::{bytes_to_key, KeyIvPair};
use openssl::symm::{self, Cipher};
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use super::passphrase_cipher::INVALID_PASSWORD_MESSAGE;

pub struct LegacyCipher;

impl LegacyCipher {
    pub fn is_legacy(ciphertext: &str) -> bool {
        ciphertext
            .trim()
            .starts_with(LEGACY_CIPHERTEXT_PREFIX)
    }

    /// Decrypt a CryptoJS passphrase ciphertext
    ///
    /// Bad padding, non-UTF-8 output and empty output all mean the passphrase
    /// was wrong and are reported as `Auth`.
    pub fn decrypt(ciphertext: &str, passphrase: &str) -> WalletResult<Zeroizing<String>> {
        let raw = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| WalletError::crypto(format!("Invalid legacy ciphertext encoding: {}", e)))?;
        let header_len = LEGACY_SALT_HEADER.len();
        if raw.len() <= header_len + LEGACY_SALT_SIZE || !raw.starts_with(LEGACY_SALT_HEADER) {
            return Err(WalletError::crypto("Legacy ciphertext is missing its salt header"));
        }
        let salt = &raw[header_len..header_len + LEGACY_SALT_SIZE];
        let body = &raw[header_len + LEGACY_SALT_SIZE..];

        let pair = derive(passphrase, salt)?;
        let cipher = Cipher::aes_256_cbc();
        let plaintext = Zeroizing::new(
            symm::decrypt(cipher, &pair.key, pair.iv.as_deref(), body)
                .map_err(|_| WalletError::auth(INVALID_PASSWORD_MESSAGE))?,
        );
        let text = std::str::from_utf8(&plaintext)
            .map_err(|_| WalletError::auth(INVALID_PASSWORD_MESSAGE))?;
        if text.is_empty() {
            return Err(WalletError::auth(INVALID_PASSWORD_MESSAGE));
        }
        Ok(Zeroizing::new(text.to_string()))
    }

    /// Produce a CryptoJS-compatible ciphertext
    pub fn encrypt(secret: &str, passphrase: &str) -> WalletResult<String> {
        let mut salt = [0u8; LEGACY_SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let pair = derive(passphrase, &salt)?;
        let body = symm::encrypt(Cipher::aes_256_cbc(), &pair.key, pair.iv.as_deref(), secret.as_bytes())?;

        let mut raw = Vec::with_capacity(LEGACY_SALT_HEADER.len() + salt.len() + body.len());
        raw.extend_from_slice(LEGACY_SALT_HEADER);
        raw.extend_from_slice(&salt);
        raw.extend_from_slice(&body);
        Ok(STANDARD.encode(raw))
    }
}

fn derive(passphrase: &str, salt: &[u8]) -> WalletResult<KeyIvPair> {
    Ok(bytes_to_key(
        Cipher::aes_256_cbc(),
        MessageDigest::md5(),
        passphrase.as_bytes(),
        Some(salt),
        1,
    )?)
}
