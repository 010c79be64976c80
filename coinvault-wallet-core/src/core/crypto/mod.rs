//! Cryptographic functionality for the wallet core
//!
//! This module provides passphrase encryption, key management and transaction signatures.
//!
//! SECURITY: private keys, seed phrases and decrypted plaintexts live in
//! zeroizing buffers and never implement `Debug` or `Clone` with their contents.

pub mod keys;
pub mod signatures;
pub mod encryption;
pub mod password;

// Re-export all public items from submodules
pub use keys::*;
pub use signatures::*;
pub use encryption::*;
pub use password::*;
