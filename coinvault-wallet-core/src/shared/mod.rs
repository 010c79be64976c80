//! Shared types, utilities, constants and the error type
//!
//! Address and amount helpers, display formatting, wire types used by more
//! than one layer, and `WalletError`.

pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

// Re-export shared components
pub use constants::*;
pub use error::*;
pub use types::*;
pub use utils::*;
