//! Passphrase key derivation for the wallet core
//!
//! This module turns a user passphrase plus a random salt into a 32-byte
//! symmetric key. The parameters used are recorded alongside every ciphertext.

pub mod key_derivation;
pub mod password_config;
pub mod password_algorithm;

// Re-export all public items from submodules
pub use key_derivation::*;
pub use password_config::*;
pub use password_algorithm::*;
