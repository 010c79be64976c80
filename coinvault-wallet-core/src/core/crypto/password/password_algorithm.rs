use crate::shared::error::WalletError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key derivation functions accepted for passphrase encryption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    Argon2,
    PBKDF2,
}

impl PasswordAlgorithm {
    /// Identifier written into the envelope
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Argon2 => "argon2id",
            Self::PBKDF2 => "pbkdf2-sha256",
        }
    }
}

impl fmt::Display for PasswordAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PasswordAlgorithm {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "argon2id" | "argon2" => Ok(Self::Argon2),
            "pbkdf2-sha256" | "pbkdf2" => Ok(Self::PBKDF2),
            other => Err(WalletError::crypto(format!("Unsupported KDF: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_parse_back() {
        for algorithm in [PasswordAlgorithm::Argon2, PasswordAlgorithm::PBKDF2] {
            assert_eq!(algorithm.as_str().parse::<PasswordAlgorithm>().unwrap(), algorithm);
        }
        assert!("scrypt".parse::<PasswordAlgorithm>().is_err());
    }
}
