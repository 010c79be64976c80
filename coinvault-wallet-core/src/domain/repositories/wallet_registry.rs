//! Remote registry of wallets owned by the signed-in user

use crate::shared::types::{Address, Balance, EncryptedKey, TransactionRecord};
use crate::shared::WalletResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `/wallet/create` and `/wallet/import`
///
/// Only client-side ciphertexts travel; the passphrase never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRegistration {
    pub wallet_address: Address,
    pub client_encrypted_private_key: Option<EncryptedKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_encrypted_mnemonic: Option<EncryptedKey>,
}

#[async_trait]
pub trait WalletRegistry: Send + Sync {
    async fn create_wallet(&self, registration: &WalletRegistration) -> WalletResult<()>;

    async fn import_wallet(&self, registration: &WalletRegistration) -> WalletResult<()>;

    /// Balance as reported by the registry, in the chain's display unit
    async fn balance(&self, address: &str) -> WalletResult<Balance>;

    async fn transactions(&self) -> WalletResult<Vec<TransactionRecord>>;
}
