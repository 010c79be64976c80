//! Core wallet functionality
//!
//! Cryptography, account management, the transaction pipeline, market data
//! and the per-user session.

pub mod crypto;
pub mod pricing;
pub mod session;
pub mod transactions;
pub mod wallet;
