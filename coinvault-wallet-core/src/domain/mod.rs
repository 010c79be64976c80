//! Domain layer - entities and repository traits
//!
//! This module contains the wallet's business concepts and the traits behind
//! which every remote service (registry, auth API, chain node, broadcaster)
//! and every storage backend sits.

pub mod entities;
pub mod repositories;

// Re-export domain components
pub use entities::*;
pub use repositories::*;
