use super::EncryptionAlgorithm;
use crate::core::crypto::password::{PasswordAlgorithm, PasswordConfig};
use crate::shared::constants::*;
use crate::shared::error::WalletError;
use crate::shared::WalletResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encrypted data structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    pub algorithm: EncryptionAlgorithm,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Passphrase-encrypted secret with everything needed to decrypt it again
///
/// Text form:
/// `$cv1$<kdf>$<kdf-params>$<b64 salt>$<aead>$<b64 nonce>$<b64 ciphertext||tag>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
    pub kdf: PasswordConfig,
    pub salt: Vec<u8>,
    pub data: EncryptedData,
}

impl EncryptedSecret {
    pub fn to_envelope(&self) -> String {
        let mut sealed = self.data.ciphertext.clone();
        sealed.extend_from_slice(&self.data.tag);
        format!(
            "${}${}${}${}${}${}${}",
            ENVELOPE_VERSION,
            self.kdf.algorithm.as_str(),
            self.kdf.encode_params(),
            STANDARD.encode(&self.salt),
            self.data.algorithm.as_str(),
            STANDARD.encode(&self.data.nonce),
            STANDARD.encode(&sealed),
        )
    }

    /// Parse an envelope; structural problems are `Crypto` errors
    pub fn parse(envelope: &str) -> WalletResult<Self> {
        let parts: Vec<&str> = envelope.trim().split('$').collect();
        if parts.len() != 8 || !parts[0].is_empty() {
            return Err(WalletError::crypto("Malformed ciphertext envelope"));
        }
        if parts[1] != ENVELOPE_VERSION {
            return Err(WalletError::crypto(format!(
                "Unsupported envelope version: {}",
                parts[1]
            )));
        }

        let kdf_algorithm: PasswordAlgorithm = parts[2].parse()?;
        let kdf = PasswordConfig::decode(kdf_algorithm, parts[3])?;
        let salt = decode_field(parts[4], "salt")?;
        let algorithm: EncryptionAlgorithm = parts[5].parse()?;
        let nonce = decode_field(parts[6], "nonce")?;
        let sealed = decode_field(parts[7], "ciphertext")?;

        if salt.len() < LEGACY_SALT_SIZE {
            return Err(WalletError::crypto("Envelope salt too short"));
        }
        if nonce.len() != NONCE_SIZE {
            return Err(WalletError::crypto(format!(
                "Envelope nonce must be {} bytes",
                NONCE_SIZE
            )));
        }
        if sealed.len() < TAG_SIZE {
            return Err(WalletError::crypto("Envelope ciphertext shorter than tag"));
        }

        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);
        Ok(Self {
            kdf,
            salt,
            data: EncryptedData {
                algorithm,
                ciphertext: ciphertext.to_vec(),
                nonce,
                tag: tag.to_vec(),
            },
        })
    }

    pub fn is_envelope(text: &str) -> bool {
        text.trim_start().starts_with(&format!("${}$", ENVELOPE_VERSION))
    }
}

fn decode_field(field: &str, name: &str) -> WalletResult<Vec<u8>> {
    STANDARD
        .decode(field)
        .map_err(|e| WalletError::crypto(format!("Invalid {} encoding: {}", name, e)))
}
