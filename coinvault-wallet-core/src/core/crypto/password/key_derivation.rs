use crate::shared::constants::KEY_SIZE;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use argon2::{Algorithm, Argon2, Params, Version};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{PasswordAlgorithm, PasswordConfig};

/// Derives symmetric keys from passphrases
pub struct KeyDerivation {
    config: PasswordConfig,
}

impl KeyDerivation {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    pub fn new_default() -> Self {
        Self::new(PasswordConfig::default())
    }

    pub fn config(&self) -> &PasswordConfig {
        &self.config
    }

    /// Derive a 32-byte key; the buffer is wiped when dropped
    pub fn derive_key(&self, passphrase: &str, salt: &[u8]) -> WalletResult<Zeroizing<[u8; KEY_SIZE]>> {
        self.config.validate()?;
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        match self.config.algorithm {
            PasswordAlgorithm::Argon2 => {
                let params = Params::new(
                    self.config.memory_cost,
                    self.config.time_cost,
                    self.config.parallelism,
                    Some(KEY_SIZE),
                )?;
                Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                    .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])?;
            }
            PasswordAlgorithm::PBKDF2 => {
                pbkdf2::<Hmac<Sha256>>(
                    passphrase.as_bytes(),
                    salt,
                    self.config.iterations,
                    &mut key[..],
                )
                .map_err(|e| WalletError::Crypto(format!("PBKDF2 error: {:?}", e)))?;
            }
        }
        Ok(key)
    }

    /// Generate a secure random salt
    pub fn generate_salt(length: usize) -> Vec<u8> {
        let mut salt = vec![0u8; length];
        OsRng.fill_bytes(&mut salt);
        salt
    }
}
