use crate::core::crypto::encryption::{PassphraseCipher, INVALID_PASSWORD_MESSAGE};
use crate::core::crypto::keys::{KeyManager, SecurePrivateKey};
use crate::core::crypto::signatures::SignatureManager;
use crate::shared::error::WalletError;
use crate::shared::types::{SignedTransaction, UnsignedTransaction};
use crate::shared::utils::same_address;
use crate::shared::WalletResult;
use zeroize::Zeroizing;

/// Decrypts a stored key with the user's passphrase and signs with it
///
/// The plaintext key only ever lives in a [`SecurePrivateKey`], which is
/// consumed by [`TransactionSigner::sign_with`] and zeroized on drop.
pub struct TransactionSigner {
    cipher: PassphraseCipher,
    signatures: SignatureManager,
    key_manager: KeyManager,
}

impl TransactionSigner {
    pub fn new(cipher: PassphraseCipher) -> Self {
        Self {
            cipher,
            signatures: SignatureManager::new(),
            key_manager: KeyManager::new(),
        }
    }

    /// Decrypt the stored key; any failure is auth-class, never a network error
    pub async fn unlock(&self, encrypted_key: Option<&str>, passphrase: &str) -> WalletResult<SecurePrivateKey> {
        let encrypted_key = encrypted_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| WalletError::missing_key("This is a watch-only wallet and cannot send"))?
            .to_string();

        let cipher = self.cipher;
        let passphrase = Zeroizing::new(passphrase.to_string());
        let plaintext = tokio::task::spawn_blocking(move || cipher.decrypt(&encrypted_key, &passphrase))
            .await?
            .map_err(|e| match e {
                WalletError::Auth(_) => e,
                other => {
                    log::warn!("Stored key could not be decrypted: {}", other);
                    WalletError::auth(INVALID_PASSWORD_MESSAGE)
                }
            })?;

        SecurePrivateKey::from_hex(plaintext.trim()).map_err(|_| WalletError::auth(INVALID_PASSWORD_MESSAGE))
    }

    /// Sign with an unlocked key, which is dropped when this returns
    pub fn sign_with(&self, unsigned: &UnsignedTransaction, private_key: SecurePrivateKey) -> WalletResult<SignedTransaction> {
        let address = self.key_manager.get_address(&private_key)?;
        if !same_address(&address, &unsigned.from) {
            return Err(WalletError::auth(format!(
                "Decrypted key belongs to {}, not {}",
                address, unsigned.from
            )));
        }
        self.signatures.sign_legacy_transaction(unsigned, &private_key)
    }

    pub async fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        encrypted_key: Option<&str>,
        passphrase: &str,
    ) -> WalletResult<SignedTransaction> {
        let private_key = self.unlock(encrypted_key, passphrase).await?;
        self.sign_with(unsigned, private_key)
    }
}
