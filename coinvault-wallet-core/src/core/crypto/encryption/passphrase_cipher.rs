use super::{EncryptedSecret, EncryptionAlgorithm, EncryptionManager, LegacyCipher};
use crate::core::crypto::password::{KeyDerivation, PasswordConfig};
use crate::shared::constants::SALT_SIZE;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use zeroize::Zeroizing;

/// Message surfaced whenever a passphrase fails to open a ciphertext
pub const INVALID_PASSWORD_MESSAGE: &str = "Invalid password";

/// Passphrase-based encryption of opaque secrets (private keys, mnemonics)
///
/// `encrypt` always writes the current envelope format with the configured KDF
/// and cipher. `decrypt` reads the parameters from the ciphertext itself, so
/// changing the configuration never strands existing secrets, and also accepts
/// ciphertexts from the browser wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassphraseCipher {
    kdf: PasswordConfig,
    algorithm: EncryptionAlgorithm,
}

impl Default for PassphraseCipher {
    fn default() -> Self {
        Self::new(PasswordConfig::default(), EncryptionAlgorithm::AES256GCM)
    }
}

impl PassphraseCipher {
    pub fn new(kdf: PasswordConfig, algorithm: EncryptionAlgorithm) -> Self {
        Self { kdf, algorithm }
    }

    pub fn kdf(&self) -> &PasswordConfig {
        &self.kdf
    }

    pub fn encrypt(&self, secret: &str, passphrase: &str) -> WalletResult<String> {
        let salt = KeyDerivation::generate_salt(SALT_SIZE);
        let key = KeyDerivation::new(self.kdf).derive_key(passphrase, &salt)?;
        let data = EncryptionManager::new(self.algorithm).encrypt(secret.as_bytes(), &key[..])?;
        Ok(EncryptedSecret {
            kdf: self.kdf,
            salt,
            data,
        }
        .to_envelope())
    }

    pub fn decrypt(&self, ciphertext: &str, passphrase: &str) -> WalletResult<Zeroizing<String>> {
        if LegacyCipher::is_legacy(ciphertext) {
            log::debug!("Decrypting legacy passphrase ciphertext");
            return LegacyCipher::decrypt(ciphertext, passphrase);
        }

        let secret = EncryptedSecret::parse(ciphertext)?;
        let key = KeyDerivation::new(secret.kdf).derive_key(passphrase, &secret.salt)?;
        let plaintext = Zeroizing::new(
            EncryptionManager::new(secret.data.algorithm)
                .decrypt(&secret.data, &key[..])
                .map_err(|e| match e {
                    WalletError::Auth(_) => WalletError::auth(INVALID_PASSWORD_MESSAGE),
                    other => other,
                })?,
        );
        let text = std::str::from_utf8(&plaintext)
            .map_err(|_| WalletError::crypto("Decrypted secret is not valid UTF-8"))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}
