//! Digital signature functionality for the wallet core
//!
//! This module handles EIP-155 ECDSA signatures for legacy transactions.

pub mod signature_manager;
pub mod transaction_signature;

// Re-export all public items from submodules
pub use signature_manager::*;
pub use transaction_signature::*;
