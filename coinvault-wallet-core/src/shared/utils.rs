//! Utility functions for the wallet core
//!
//! This module contains common utility functions used throughout the wallet core.

use crate::shared::constants::*;
use crate::shared::error::WalletError;
use ethers::types::U256;
use sha3::{Digest, Keccak256};

/// Keccak256 hash function
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Validate Ethereum address format
pub fn validate_ethereum_address(address: &str) -> Result<(), WalletError> {
    if !address.starts_with("0x") {
        return Err(WalletError::validation("Address must start with 0x"));
    }

    if address.len() != ADDRESS_LENGTH {
        return Err(WalletError::validation("Address must be 42 characters long"));
    }

    // Check if all characters after 0x are valid hex
    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::validation("Address contains invalid hex characters"));
    }

    Ok(())
}

/// EIP-55 mixed-case checksum encoding of a 20-byte address
pub fn to_checksum_address(address_bytes: &[u8]) -> String {
    let lower = hex::encode(address_bytes);
    let hash = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(ADDRESS_LENGTH);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Normalise a validated address string to its checksummed form
pub fn checksum_address(address: &str) -> Result<String, WalletError> {
    validate_ethereum_address(address)?;
    let bytes = hex::decode(&address[2..])?;
    Ok(to_checksum_address(&bytes))
}

/// Case-insensitive address comparison
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Parse a decimal ether amount ("0.25") into wei; zero and negatives are rejected
pub fn parse_ether_amount(amount: &str) -> Result<U256, WalletError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(WalletError::validation("Amount is required"));
    }
    if trimmed.starts_with('-') {
        return Err(WalletError::validation("Amount must be positive"));
    }
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.len() > ETHER_DECIMALS as usize {
            return Err(WalletError::validation(format!(
                "Amount '{}' has more than {} decimal places",
                trimmed, ETHER_DECIMALS
            )));
        }
    }
    let wei = ethers::utils::parse_ether(trimmed)
        .map_err(|e| WalletError::validation(format!("Invalid amount '{}': {}", trimmed, e)))?;
    if wei.is_zero() {
        return Err(WalletError::validation("Amount must be greater than zero"));
    }
    Ok(wei)
}

/// Format a wei value as a decimal ether string
pub fn format_ether_amount(wei: U256) -> String {
    ethers::utils::format_ether(wei)
}

/// Parse a `0x` hex quantity as returned by JSON-RPC; `"0x"` carries no value and is rejected
pub fn parse_hex_u64(value: &str) -> Result<u64, WalletError> {
    let clean = value.trim_start_matches("0x");
    if clean.is_empty() {
        return Err(WalletError::validation(format!("Empty hex quantity: {:?}", value)));
    }
    u64::from_str_radix(clean, 16)
        .map_err(|_| WalletError::validation(format!("Invalid hex quantity: {}", value)))
}

pub fn parse_hex_u256(value: &str) -> Result<U256, WalletError> {
    let clean = value.trim_start_matches("0x");
    if clean.is_empty() {
        return Err(WalletError::validation(format!("Empty hex quantity: {:?}", value)));
    }
    U256::from_str_radix(clean, 16)
        .map_err(|_| WalletError::validation(format!("Invalid hex quantity: {}", value)))
}

/// Validate email the way the registration form does
pub fn validate_email(email: &str) -> Result<(), WalletError> {
    let invalid = || WalletError::validation("Please enter a valid email address.");
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || local.contains(' ') || domain.contains(' ') || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || !(2..=3).contains(&tld.len()) || !tld.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(invalid());
    }
    Ok(())
}

/// Validate account password length
pub fn validate_password(password: &str) -> Result<(), WalletError> {
    if password.chars().count() < MIN_ACCOUNT_PASSWORD_LENGTH {
        return Err(WalletError::validation(format!(
            "Password must be at least {} characters long.",
            MIN_ACCOUNT_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Validate a wallet passphrase before it is used as key material
pub fn validate_passphrase(passphrase: &str) -> Result<(), WalletError> {
    if passphrase.is_empty() {
        return Err(WalletError::validation("Passphrase cannot be empty"));
    }
    Ok(())
}

/// Shorten an address for display: first 8 and last 8 characters
pub fn format_address(address: &str) -> String {
    if address.is_empty() {
        return "Not Connected".to_string();
    }
    if address.len() <= 20 {
        return address.to_string();
    }
    format!("{}...{}", &address[..8], &address[address.len() - 8..])
}

/// Compact large numbers with K/M/B/T suffixes
pub fn format_large_number(num: f64) -> String {
    if num == 0.0 || !num.is_finite() {
        return "0".to_string();
    }
    if num >= 1e12 {
        format!("{:.2}T", num / 1e12)
    } else if num >= 1e9 {
        format!("{:.2}B", num / 1e9)
    } else if num >= 1e6 {
        format!("{:.2}M", num / 1e6)
    } else if num >= 1e3 {
        format!("{:.2}K", num / 1e3)
    } else {
        format!("{:.2}", num)
    }
}

/// USD price formatting: two decimals at or above $1, up to eight below
pub fn format_price(price: f64) -> String {
    if price <= 0.0 || !price.is_finite() {
        return "$0.00".to_string();
    }
    if price >= 1.0 {
        return format!("${}", group_thousands(&format!("{:.2}", price)));
    }
    let formatted = format!("{:.8}", price);
    let trimmed = formatted.trim_end_matches('0');
    let (int_part, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let frac = if frac.len() < 2 { format!("{:0<2}", frac) } else { frac.to_string() };
    format!("${}.{}", int_part, frac)
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed, ""));
    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}
