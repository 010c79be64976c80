//! Infrastructure layer - concrete implementations of the domain traits
//!
//! HTTP clients for the backend and the chain node, configuration, logging
//! and session storage backends.

pub mod api;
pub mod config;
pub mod logger;
pub mod rpc;
pub mod storage;

// Re-export infrastructure components
pub use api::ApiClient;
pub use config::{BroadcastTarget, WalletConfig};
pub use logger::init_logging;
pub use rpc::RpcClient;
pub use storage::{FileSessionStorage, MemoryStorage};
