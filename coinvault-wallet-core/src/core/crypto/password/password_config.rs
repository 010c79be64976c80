use super::PasswordAlgorithm;
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key derivation configuration
///
/// `memory_cost` (KiB), `time_cost` and `parallelism` apply to Argon2id;
/// `iterations` applies to PBKDF2. Only the fields of the selected algorithm
/// are written to an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub algorithm: PasswordAlgorithm,
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub iterations: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            algorithm: PasswordAlgorithm::Argon2,
            memory_cost: ARGON2_MEMORY_COST,
            time_cost: ARGON2_TIME_COST,
            parallelism: ARGON2_PARALLELISM,
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

impl PasswordConfig {
    pub fn pbkdf2(iterations: u32) -> Self {
        Self {
            algorithm: PasswordAlgorithm::PBKDF2,
            iterations,
            ..Self::default()
        }
    }

    pub fn argon2(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            algorithm: PasswordAlgorithm::Argon2,
            memory_cost,
            time_cost,
            parallelism,
            ..Self::default()
        }
    }

    /// Encode the parameters of the selected algorithm, e.g. `m=65536,t=3,p=1`
    pub fn encode_params(&self) -> String {
        match self.algorithm {
            PasswordAlgorithm::Argon2 => format!(
                "m={},t={},p={}",
                self.memory_cost, self.time_cost, self.parallelism
            ),
            PasswordAlgorithm::PBKDF2 => format!("i={}", self.iterations),
        }
    }

    /// Rebuild a configuration from an envelope's KDF identifier and parameters
    pub fn decode(algorithm: PasswordAlgorithm, params: &str) -> WalletResult<Self> {
        let mut config = Self {
            algorithm,
            ..Self::default()
        };
        let mut seen = 0usize;
        for pair in params.split(',') {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| WalletError::crypto(format!("Malformed KDF parameter: {}", pair)))?;
            let value: u32 = value
                .parse()
                .map_err(|_| WalletError::crypto(format!("Invalid KDF parameter value: {}", pair)))?;
            match (algorithm, name) {
                (PasswordAlgorithm::Argon2, "m") => config.memory_cost = value,
                (PasswordAlgorithm::Argon2, "t") => config.time_cost = value,
                (PasswordAlgorithm::Argon2, "p") => config.parallelism = value,
                (PasswordAlgorithm::PBKDF2, "i") => config.iterations = value,
                _ => {
                    return Err(WalletError::crypto(format!(
                        "Unknown {} parameter: {}",
                        algorithm, name
                    )))
                }
            }
            seen += 1;
        }
        let expected = match algorithm {
            PasswordAlgorithm::Argon2 => 3,
            PasswordAlgorithm::PBKDF2 => 1,
        };
        if seen != expected {
            return Err(WalletError::crypto(format!(
                "Expected {} {} parameters, found {}",
                expected, algorithm, seen
            )));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WalletResult<()> {
        match self.algorithm {
            PasswordAlgorithm::Argon2 => {
                if self.time_cost == 0 || self.parallelism == 0 {
                    return Err(WalletError::crypto("Argon2 time cost and parallelism must be non-zero"));
                }
                if self.memory_cost > MAX_ARGON2_MEMORY_COST
                    || self.time_cost > MAX_ARGON2_TIME_COST
                    || self.parallelism > MAX_ARGON2_PARALLELISM
                {
                    return Err(WalletError::crypto(format!(
                        "Argon2 cost exceeds limits (m<={}, t<={}, p<={})",
                        MAX_ARGON2_MEMORY_COST, MAX_ARGON2_TIME_COST, MAX_ARGON2_PARALLELISM
                    )));
                }
                if self.memory_cost < 8 * self.parallelism {
                    return Err(WalletError::crypto("Argon2 memory cost too small for parallelism"));
                }
            }
            PasswordAlgorithm::PBKDF2 => {
                if self.iterations == 0 {
                    return Err(WalletError::crypto("PBKDF2 iterations must be non-zero"));
                }
                if self.iterations > MAX_PBKDF2_ITERATIONS {
                    return Err(WalletError::crypto(format!(
                        "PBKDF2 iterations exceed {}",
                        MAX_PBKDF2_ITERATIONS
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for PasswordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.algorithm, self.encode_params())
    }
}
