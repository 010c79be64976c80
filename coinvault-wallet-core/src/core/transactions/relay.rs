use crate::domain::repositories::Broadcaster;
use crate::shared::error::WalletError;
use crate::shared::types::{BroadcastReceipt, SignedTransaction};
use crate::shared::WalletResult;
use std::sync::Arc;

/// Forwards signed transactions to a broadcaster, exactly once
pub struct SubmissionRelay {
    broadcaster: Arc<dyn Broadcaster>,
}

impl SubmissionRelay {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { broadcaster }
    }

    pub fn broadcaster_name(&self) -> &'static str {
        self.broadcaster.name()
    }

    /// Submit once; a rejection carries the remote message verbatim
    pub async fn broadcast(&self, signed: &SignedTransaction) -> WalletResult<BroadcastReceipt> {
        log::info!(
            "Broadcasting {} via {} (nonce {})",
            signed.hash,
            self.broadcaster.name(),
            signed.nonce
        );

        match self.broadcaster.broadcast_raw(&signed.raw_hex()).await {
            Ok(remote_hash) => {
                let tx_hash = match remote_hash {
                    Some(hash) if !hash.is_empty() => {
                        if !hash.eq_ignore_ascii_case(&signed.hash) {
                            log::warn!("Broadcaster reported hash {} for local {}", hash, signed.hash);
                        }
                        hash
                    }
                    _ => signed.hash.clone(),
                };
                Ok(BroadcastReceipt { tx_hash })
            }
            Err(WalletError::ServerRejected(message)) => {
                log::warn!("Broadcast of {} rejected: {}", signed.hash, message);
                Err(WalletError::broadcast(message))
            }
            Err(e) => Err(e),
        }
    }
}
