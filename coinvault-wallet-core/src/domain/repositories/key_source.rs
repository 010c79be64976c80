//! Where a send flow gets the encrypted private key from

use crate::domain::entities::Account;
use crate::shared::error::WalletError;
use crate::shared::types::EncryptedKey;
use crate::shared::utils::same_address;
use crate::shared::WalletResult;
use async_trait::async_trait;

#[async_trait]
pub trait KeySource: Send + Sync {
    /// Encrypted key for `address`, or `None` for a watch-only account
    async fn encrypted_key(&self, address: &str) -> WalletResult<Option<EncryptedKey>>;
}

/// A locally held account answers for its own address only
#[async_trait]
impl KeySource for Account {
    async fn encrypted_key(&self, address: &str) -> WalletResult<Option<EncryptedKey>> {
        if !same_address(self.address(), address) {
            return Err(WalletError::validation(format!(
                "Account {} cannot provide a key for {}",
                self.address(),
                address
            )));
        }
        Ok(self.encrypted_private_key().map(str::to_string))
    }
}
