//! Read access to chain state

use crate::shared::types::GasEstimateRequest;
use crate::shared::WalletResult;
use async_trait::async_trait;
use ethers::types::U256;

/// Chain state needed to assemble a transfer
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Pending transaction count of `address`
    async fn transaction_count(&self, address: &str) -> WalletResult<u64>;

    /// Current network gas price in wei
    async fn gas_price(&self) -> WalletResult<u64>;

    /// Gas needed by this specific transfer
    async fn estimate_gas(&self, request: &GasEstimateRequest) -> WalletResult<u64>;

    /// Balance of `address` in wei
    async fn balance(&self, address: &str) -> WalletResult<U256>;
}
