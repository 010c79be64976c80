//! Account management for the wallet core
//!
//! Creates and imports accounts. Secrets are encrypted with the user's
//! passphrase before anything is sent to the registry; the passphrase and the
//! plaintext key never leave this process.

use crate::core::crypto::encryption::PassphraseCipher;
use crate::core::crypto::keys::{KeyManager, SecurePrivateKey, SecureSeedPhrase};
use crate::domain::entities::{Account, CreatedAccount, ImportInput};
use crate::domain::repositories::{WalletRegistration, WalletRegistry};
use crate::shared::types::{Balance, EncryptedKey, TransactionRecord};
use crate::shared::utils::{validate_ethereum_address, validate_passphrase};
use crate::shared::WalletResult;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Account manager backed by the remote wallet registry
pub struct AccountManager {
    registry: Arc<dyn WalletRegistry>,
    cipher: PassphraseCipher,
    key_manager: KeyManager,
}

impl AccountManager {
    pub fn new(registry: Arc<dyn WalletRegistry>, cipher: PassphraseCipher) -> Self {
        Self {
            registry,
            cipher,
            key_manager: KeyManager::new(),
        }
    }

    /// Create a fresh account from a new 12-word mnemonic
    ///
    /// The mnemonic is returned once, for the user to write down.
    pub async fn create_account(&self, passphrase: &str) -> WalletResult<CreatedAccount> {
        validate_passphrase(passphrase)?;

        let seed_phrase = self.key_manager.generate_seed_phrase()?;
        let private_key = self.key_manager.derive_private_key_from_seed(&seed_phrase)?;
        let address = self.key_manager.get_address(&private_key)?;

        let encrypted_key = self.seal(private_key.to_hex(), passphrase).await?;
        let encrypted_mnemonic = self
            .seal(Zeroizing::new(seed_phrase.as_str().to_string()), passphrase)
            .await?;

        let registration = WalletRegistration {
            wallet_address: address.clone(),
            client_encrypted_private_key: Some(encrypted_key.clone()),
            client_encrypted_mnemonic: Some(encrypted_mnemonic.clone()),
        };
        self.registry.create_wallet(&registration).await?;
        log::info!("Created wallet {}", address);

        let account = Account::new(&address, Some(encrypted_key))?.with_encrypted_mnemonic(encrypted_mnemonic);
        Ok(CreatedAccount { account, seed_phrase })
    }

    /// Import from a private key (64 hex digits, `0x` optional) or a bare address
    pub async fn import_account(&self, input: &str, passphrase: &str) -> WalletResult<Account> {
        match ImportInput::classify(input)? {
            ImportInput::PrivateKey(hex_key) => {
                validate_passphrase(passphrase)?;
                let private_key = SecurePrivateKey::from_hex(&hex_key)?;
                drop(hex_key);
                self.import_private_key(private_key, None, passphrase).await
            }
            ImportInput::WatchOnly(address) => {
                validate_ethereum_address(&address)?;
                let account = Account::watch_only(&address)?;
                let registration = WalletRegistration {
                    wallet_address: account.address().to_string(),
                    client_encrypted_private_key: None,
                    client_encrypted_mnemonic: None,
                };
                self.registry.import_wallet(&registration).await?;
                log::info!("Imported watch-only wallet {}", account.address());
                Ok(account)
            }
        }
    }

    /// Import from a BIP-39 phrase, using the same derivation path as creation
    pub async fn import_mnemonic(&self, phrase: &str, passphrase: &str) -> WalletResult<Account> {
        let seed_phrase = self.key_manager.parse_seed_phrase(phrase)?;
        validate_passphrase(passphrase)?;
        let private_key = self.key_manager.derive_private_key_from_seed(&seed_phrase)?;
        self.import_private_key(private_key, Some(&seed_phrase), passphrase)
            .await
    }

    pub async fn balance(&self, address: &str) -> WalletResult<Balance> {
        validate_ethereum_address(address)?;
        self.registry.balance(address).await
    }

    pub async fn transactions(&self) -> WalletResult<Vec<TransactionRecord>> {
        self.registry.transactions().await
    }

    async fn import_private_key(
        &self,
        private_key: SecurePrivateKey,
        seed_phrase: Option<&SecureSeedPhrase>,
        passphrase: &str,
    ) -> WalletResult<Account> {
        let address = self.key_manager.get_address(&private_key)?;
        let encrypted_key = self.seal(private_key.to_hex(), passphrase).await?;
        drop(private_key);

        let encrypted_mnemonic = match seed_phrase {
            Some(phrase) => Some(
                self.seal(Zeroizing::new(phrase.as_str().to_string()), passphrase)
                    .await?,
            ),
            None => None,
        };

        let registration = WalletRegistration {
            wallet_address: address.clone(),
            client_encrypted_private_key: Some(encrypted_key.clone()),
            client_encrypted_mnemonic: encrypted_mnemonic.clone(),
        };
        self.registry.import_wallet(&registration).await?;
        log::info!("Imported wallet {}", address);

        let account = Account::new(&address, Some(encrypted_key))?;
        Ok(match encrypted_mnemonic {
            Some(mnemonic) => account.with_encrypted_mnemonic(mnemonic),
            None => account,
        })
    }

    /// Run the KDF and cipher off the async executor
    async fn seal(&self, secret: Zeroizing<String>, passphrase: &str) -> WalletResult<EncryptedKey> {
        let cipher = self.cipher;
        let passphrase = Zeroizing::new(passphrase.to_string());
        tokio::task::spawn_blocking(move || cipher.encrypt(&secret, &passphrase)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::WalletError;
    use crate::testing::{test_cipher, RecordingRegistry};

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe512961708279f1d7b1b3a3c1b7e0a1";
    const MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn manager(registry: Arc<RecordingRegistry>) -> AccountManager {
        AccountManager::new(registry, test_cipher())
    }

    #[tokio::test]
    async fn test_create_account_registers_ciphertexts_only() {
        let registry = Arc::new(RecordingRegistry::default());
        let created = manager(registry.clone()).create_account("hunter22").await.unwrap();

        assert_eq!(created.seed_phrase.word_count(), 12);
        let created_calls = registry.created.lock().unwrap();
        assert_eq!(created_calls.len(), 1);
        let registration = &created_calls[0];
        assert_eq!(registration.wallet_address, created.account.address());

        let encrypted = registration.client_encrypted_private_key.as_deref().unwrap();
        assert!(!encrypted.contains("hunter22"));
        let plaintext = test_cipher().decrypt(encrypted, "hunter22").unwrap();
        let key = SecurePrivateKey::from_hex(&plaintext).unwrap();
        assert_eq!(KeyManager::new().get_address(&key).unwrap(), created.account.address());

        let mnemonic = test_cipher()
            .decrypt(registration.client_encrypted_mnemonic.as_deref().unwrap(), "hunter22")
            .unwrap();
        assert_eq!(mnemonic.as_str(), created.seed_phrase.as_str());
    }

    #[tokio::test]
    async fn test_create_account_surfaces_server_rejection() {
        let registry = Arc::new(RecordingRegistry::failing(WalletError::server_rejected(Some(
            "Wallet already exists".to_string(),
        ))));
        let error = manager(registry).create_account("hunter22").await.unwrap_err();
        assert_eq!(error, WalletError::ServerRejected("Wallet already exists".to_string()));
    }

    #[tokio::test]
    async fn test_create_account_requires_passphrase() {
        let registry = Arc::new(RecordingRegistry::default());
        let error = manager(registry.clone()).create_account("").await.unwrap_err();
        assert!(error.is_validation());
        assert_eq!(registry.calls(), 0);
    }

    #[tokio::test]
    async fn test_import_private_key_with_and_without_prefix() {
        let registry = Arc::new(RecordingRegistry::default());
        let manager = manager(registry.clone());

        let prefixed = manager.import_account(KEY, "pw-123456").await.unwrap();
        let bare = manager.import_account(&KEY[2..], "pw-123456").await.unwrap();
        assert_eq!(prefixed.address(), bare.address());
        assert!(!prefixed.is_watch_only());

        let imported = registry.imported.lock().unwrap();
        assert_eq!(imported.len(), 2);
        assert!(imported[0].client_encrypted_private_key.is_some());
        assert!(imported[0].client_encrypted_mnemonic.is_none());
    }

    #[tokio::test]
    async fn test_import_watch_only_sends_no_key() {
        let registry = Arc::new(RecordingRegistry::default());
        let account = manager(registry.clone())
            .import_account("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", "")
            .await
            .unwrap();

        assert!(account.is_watch_only());
        assert_eq!(account.address(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        let imported = registry.imported.lock().unwrap();
        assert_eq!(imported[0].client_encrypted_private_key, None);
    }

    #[tokio::test]
    async fn test_import_rejects_other_lengths_without_calls() {
        let registry = Arc::new(RecordingRegistry::default());
        let manager = manager(registry.clone());

        for input in ["0x1234", "", "not a key at all", &KEY[..65]] {
            let error = manager.import_account(input, "pw-123456").await.unwrap_err();
            assert!(error.is_validation(), "input {:?}", input);
        }
        assert_eq!(registry.calls(), 0);
    }

    #[tokio::test]
    async fn test_import_mnemonic_uses_standard_path() {
        let registry = Arc::new(RecordingRegistry::default());
        let account = manager(registry.clone())
            .import_mnemonic(MNEMONIC, "pw-123456")
            .await
            .unwrap();
        assert_eq!(account.address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert!(account.encrypted_mnemonic().is_some());

        let error = manager(registry)
            .import_mnemonic("abandon abandon", "pw-123456")
            .await
            .unwrap_err();
        assert!(error.is_validation());
    }

    #[tokio::test]
    async fn test_balance_validates_address_first() {
        let registry = Arc::new(RecordingRegistry::default());
        let manager = manager(registry);
        assert!(manager.balance("0x12").await.unwrap_err().is_validation());
        assert_eq!(
            manager.balance("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").await.unwrap(),
            "1.25"
        );
    }
}
