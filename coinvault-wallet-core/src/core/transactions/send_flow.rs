use super::builder::{TransactionBuilder, TransferRequest};
use super::relay::SubmissionRelay;
use super::signer::TransactionSigner;
use crate::domain::repositories::KeySource;
use crate::shared::error::WalletError;
use crate::shared::types::BroadcastReceipt;
use crate::shared::WalletResult;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;
use zeroize::Zeroizing;

/// States of a single send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    KeyRequested,
    KeyDecrypted,
    Built,
    Signed,
    Broadcast,
    Done,
    Failed,
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::KeyRequested => "key-requested",
            Self::KeyDecrypted => "key-decrypted",
            Self::Built => "built",
            Self::Signed => "signed",
            Self::Broadcast => "broadcast",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything a send needs, shared by every flow
pub struct SendPipeline {
    key_source: Arc<dyn KeySource>,
    builder: TransactionBuilder,
    signer: TransactionSigner,
    relay: SubmissionRelay,
}

impl SendPipeline {
    pub fn new(
        key_source: Arc<dyn KeySource>,
        builder: TransactionBuilder,
        signer: TransactionSigner,
        relay: SubmissionRelay,
    ) -> Self {
        Self {
            key_source,
            builder,
            signer,
            relay,
        }
    }

    pub fn broadcaster_name(&self) -> &'static str {
        self.relay.broadcaster_name()
    }

    /// Start a new flow in `Idle`
    pub fn flow(&self, from: &str, to: &str, amount: &str, passphrase: &str) -> SendFlow<'_> {
        SendFlow {
            pipeline: self,
            id: Uuid::new_v4(),
            state: SendState::Idle,
            trail: vec![SendState::Idle],
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
            passphrase: Zeroizing::new(passphrase.to_string()),
        }
    }

    pub async fn send(&self, from: &str, to: &str, amount: &str, passphrase: &str) -> SendOutcome {
        self.flow(from, to, amount, passphrase).run().await
    }
}

/// How a flow ended and the states it passed through
#[derive(Debug)]
pub struct SendOutcome {
    pub flow_id: Uuid,
    pub trail: Vec<SendState>,
    /// State whose step failed, when the flow did not reach `Done`
    pub failed_at: Option<SendState>,
    pub result: WalletResult<BroadcastReceipt>,
}

impl SendOutcome {
    pub fn final_state(&self) -> SendState {
        self.trail.last().copied().unwrap_or(SendState::Idle)
    }

    pub fn into_result(self) -> WalletResult<BroadcastReceipt> {
        self.result
    }
}

/// One send, moving forward only
///
/// `run` consumes the flow, so a finished or failed flow cannot be resumed;
/// a retry starts again from `Idle` with a new flow.
pub struct SendFlow<'a> {
    pipeline: &'a SendPipeline,
    id: Uuid,
    state: SendState,
    trail: Vec<SendState>,
    from: String,
    to: String,
    amount: String,
    passphrase: Zeroizing<String>,
}

impl<'a> SendFlow<'a> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    fn advance(&mut self, next: SendState) {
        log::debug!("[send {}] {} -> {}", self.id, self.state, next);
        self.state = next;
        self.trail.push(next);
    }

    fn fail(mut self, error: WalletError) -> SendOutcome {
        let failed_at = self.state;
        log::warn!("[send {}] failed at {}: {}", self.id, failed_at, error);
        self.advance(SendState::Failed);
        SendOutcome {
            flow_id: self.id,
            trail: self.trail,
            failed_at: Some(failed_at),
            result: Err(error),
        }
    }

    pub async fn run(mut self) -> SendOutcome {
        let pipeline = self.pipeline;

        let request = match TransferRequest::new(&self.from, &self.to, &self.amount) {
            Ok(request) => request,
            Err(e) => return self.fail(e),
        };
        log::info!("[send {}] {} -> {}", self.id, request.from, request.to);

        self.advance(SendState::KeyRequested);
        let encrypted_key = match pipeline.key_source.encrypted_key(&request.from).await {
            Ok(key) => key,
            Err(e) => return self.fail(e),
        };
        let unlocked = pipeline
            .signer
            .unlock(encrypted_key.as_deref(), &self.passphrase)
            .await;
        let private_key = match unlocked {
            Ok(key) => key,
            Err(e) => return self.fail(e),
        };

        self.advance(SendState::KeyDecrypted);
        let unsigned = match pipeline.builder.build(&request).await {
            Ok(unsigned) => unsigned,
            Err(e) => return self.fail(e),
        };

        self.advance(SendState::Built);
        let signed = match pipeline.signer.sign_with(&unsigned, private_key) {
            Ok(signed) => signed,
            Err(e) => return self.fail(e),
        };

        self.advance(SendState::Signed);
        self.advance(SendState::Broadcast);
        let receipt = match pipeline.relay.broadcast(&signed).await {
            Ok(receipt) => receipt,
            Err(e) => return self.fail(e),
        };

        self.advance(SendState::Done);
        log::info!("[send {}] broadcast {}", self.id, receipt.tx_hash);
        SendOutcome {
            flow_id: self.id,
            trail: self.trail,
            failed_at: None,
            result: Ok(receipt),
        }
    }
}
