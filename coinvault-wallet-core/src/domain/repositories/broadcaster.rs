//! Submission of signed transactions

use crate::shared::types::TransactionHash;
use crate::shared::WalletResult;
use async_trait::async_trait;

/// Something that accepts raw signed transactions for inclusion
///
/// Implementations report the remote's own failure text as `ServerRejected`
/// and transport problems as `NetworkUnavailable`; they never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Short label used in log lines
    fn name(&self) -> &'static str;

    /// Submit `0x`-prefixed raw transaction hex; returns the remote's tx hash if it sent one
    async fn broadcast_raw(&self, raw_hex: &str) -> WalletResult<Option<TransactionHash>>;
}
