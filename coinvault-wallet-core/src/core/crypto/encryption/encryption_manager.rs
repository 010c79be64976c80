use crate::shared::constants::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use aes_gcm::aead::{Aead, KeyInit, Nonce};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use rand_core::OsRng;
use rand_core::RngCore;
use super::{EncryptionAlgorithm, EncryptedData};

/// Secure encryption manager
pub struct EncryptionManager {
    algorithm: EncryptionAlgorithm,
}

impl EncryptionManager {
    pub fn new(algorithm: EncryptionAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn new_default() -> Self {
        Self::new(EncryptionAlgorithm::AES256GCM)
    }

    pub fn algorithm(&self) -> EncryptionAlgorithm {
        self.algorithm
    }

    /// Encrypt data with a key
    pub fn encrypt(&self, data: &[u8], key: &[u8]) -> WalletResult<EncryptedData> {
        check_key(key)?;
        let nonce = generate_nonce();
        let sealed = match self.algorithm {
            EncryptionAlgorithm::AES256GCM => seal::<Aes256Gcm>(key, &nonce, data)?,
            EncryptionAlgorithm::ChaCha20Poly1305 => seal::<ChaCha20Poly1305>(key, &nonce, data)?,
        };

        // Split ciphertext and tag
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);
        Ok(EncryptedData {
            algorithm: self.algorithm,
            ciphertext: ciphertext.to_vec(),
            nonce,
            tag: tag.to_vec(),
        })
    }

    /// Decrypt data with a key
    ///
    /// The algorithm recorded in `encrypted_data` wins over the manager's own.
    /// A tag mismatch is reported as `Auth`, since it is what a wrong key looks like.
    pub fn decrypt(&self, encrypted_data: &EncryptedData, key: &[u8]) -> WalletResult<Vec<u8>> {
        check_key(key)?;
        if encrypted_data.nonce.len() != NONCE_SIZE {
            return Err(WalletError::crypto(format!("Nonce must be {} bytes", NONCE_SIZE)));
        }
        if encrypted_data.tag.len() != TAG_SIZE {
            return Err(WalletError::crypto(format!("Tag must be {} bytes", TAG_SIZE)));
        }

        // Combine ciphertext and tag
        let mut sealed = encrypted_data.ciphertext.clone();
        sealed.extend_from_slice(&encrypted_data.tag);

        match encrypted_data.algorithm {
            EncryptionAlgorithm::AES256GCM => open::<Aes256Gcm>(key, &encrypted_data.nonce, &sealed),
            EncryptionAlgorithm::ChaCha20Poly1305 => {
                open::<ChaCha20Poly1305>(key, &encrypted_data.nonce, &sealed)
            }
        }
    }
}

fn check_key(key: &[u8]) -> WalletResult<()> {
    if key.len() != KEY_SIZE {
        return Err(WalletError::Crypto(format!("Cipher requires {}-byte key", KEY_SIZE)));
    }
    Ok(())
}

fn seal<C: Aead + KeyInit>(key: &[u8], nonce: &[u8], data: &[u8]) -> WalletResult<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|e| WalletError::crypto(e.to_string()))?;
    cipher
        .encrypt(Nonce::<C>::from_slice(nonce), data)
        .map_err(|e| WalletError::Crypto(format!("Encryption failed: {}", e)))
}

fn open<C: Aead + KeyInit>(key: &[u8], nonce: &[u8], sealed: &[u8]) -> WalletResult<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|e| WalletError::crypto(e.to_string()))?;
    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), sealed)
        .map_err(|_| WalletError::auth("Decryption failed: authentication tag mismatch"))
}

/// Generate a secure random nonce
fn generate_nonce() -> Vec<u8> {
    let mut nonce = vec![0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
