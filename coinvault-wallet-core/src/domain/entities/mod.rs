//! Domain entities and value objects

pub mod account;
pub mod asset;

// Re-export entities
pub use account::*;
pub use asset::*;
