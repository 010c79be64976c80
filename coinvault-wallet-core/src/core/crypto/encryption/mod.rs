//! Encryption functionality for the wallet core
//!
//! This module handles AES-256-GCM and ChaCha20-Poly1305 encryption for sensitive data,
//! the passphrase envelope stored by the registry, and decryption of ciphertexts
//! written by the older browser wallet.

pub mod encryption_manager;
pub mod encryption_algorithm;
pub mod encrypted_data;
pub mod passphrase_cipher;
pub mod legacy_cipher;

// Re-export all public items from submodules
pub use encryption_manager::*;
pub use encryption_algorithm::*;
pub use encrypted_data::*;
pub use passphrase_cipher::*;
pub use legacy_cipher::*;
