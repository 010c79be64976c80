//! Domain repositories
//!
//! Traits for every external collaborator. Infrastructure provides the HTTP,
//! JSON-RPC and file implementations; tests provide in-memory ones.

pub mod auth_repository;
pub mod broadcaster;
pub mod chain_repository;
pub mod key_source;
pub mod price_repository;
pub mod storage_repository;
pub mod wallet_registry;

// Re-export repositories
pub use auth_repository::*;
pub use broadcaster::*;
pub use chain_repository::*;
pub use key_source::*;
pub use price_repository::*;
pub use storage_repository::*;
pub use wallet_registry::*;
