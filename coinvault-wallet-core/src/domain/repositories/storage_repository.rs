//! Key-value storage for per-user session state

use crate::shared::WalletResult;

/// String key-value store playing the role of browser local storage
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> WalletResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> WalletResult<()>;

    fn remove(&self, key: &str) -> WalletResult<()>;
}
