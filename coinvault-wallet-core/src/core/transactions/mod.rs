//! Transaction pipeline for the wallet core
//!
//! Building from live chain state, signing with a passphrase-unlocked key,
//! submission to a broadcaster, and the send state machine tying them together.

pub mod builder;
pub mod relay;
pub mod send_flow;
pub mod signer;

pub use builder::{TransactionBuilder, TransferRequest};
pub use relay::SubmissionRelay;
pub use send_flow::{SendFlow, SendOutcome, SendPipeline, SendState};
pub use signer::TransactionSigner;
