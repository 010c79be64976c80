use super::TransactionSignature;
use crate::core::crypto::keys::{KeyManager, SecurePrivateKey};
use crate::shared::error::WalletError;
use crate::shared::types::{Address, SignedTransaction, UnsignedTransaction};
use crate::shared::utils::keccak256;
use crate::shared::WalletResult;
use ethers::types::U256;
use rlp::{Rlp, RlpStream};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};

/// Digital signature manager
pub struct SignatureManager {
    secp: Secp256k1<secp256k1::All>,
}

impl Default for SignatureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureManager {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Sign a legacy (pre-1559) transaction with EIP-155 replay protection
    ///
    /// The key is borrowed only for the duration of the call.
    pub fn sign_legacy_transaction(
        &self,
        tx: &UnsignedTransaction,
        private_key: &SecurePrivateKey,
    ) -> WalletResult<SignedTransaction> {
        let fields = LegacyFields::from_unsigned(tx)?;

        let sighash = keccak256(&fields.signing_payload(tx.chain_id));
        let msg = Message::from_digest(sighash);
        let secret_key = private_key.secret_key()?;
        let rec_sig: RecoverableSignature = self.secp.sign_ecdsa_recoverable(msg, &secret_key);
        let (rec_id, compact) = rec_sig.serialize_compact();

        let mut signature = TransactionSignature {
            r: [0u8; 32],
            s: [0u8; 32],
            v: Self::calculate_v_eip155(rec_id, tx.chain_id),
        };
        signature.r.copy_from_slice(&compact[0..32]);
        signature.s.copy_from_slice(&compact[32..64]);

        let raw = fields.signed_payload(&signature);
        let hash = format!("0x{}", hex::encode(keccak256(&raw)));
        log::debug!("Signed transaction {} (nonce {}, chain {})", hash, tx.nonce, tx.chain_id);

        Ok(SignedTransaction {
            from: tx.from.clone(),
            nonce: tx.nonce,
            raw,
            hash,
        })
    }

    /// Recover the sending address from raw signed bytes
    pub fn recover_sender(&self, raw: &[u8]) -> WalletResult<Address> {
        let rlp = Rlp::new(raw);
        let count = rlp.item_count().map_err(decode_error)?;
        if !rlp.is_list() || count != 9 {
            return Err(WalletError::crypto("Not a legacy signed transaction"));
        }

        let signature = TransactionSignature {
            v: be_bytes_to_u64(rlp.at(6).map_err(decode_error)?.data().map_err(decode_error)?)?,
            r: left_pad_32(rlp.at(7).map_err(decode_error)?.data().map_err(decode_error)?)?,
            s: left_pad_32(rlp.at(8).map_err(decode_error)?.data().map_err(decode_error)?)?,
        };

        let mut payload = RlpStream::new_list(9);
        for i in 0..6 {
            payload.append_raw(rlp.at(i).map_err(decode_error)?.as_raw(), 1);
        }
        payload.append(&signature.chain_id()?);
        payload.append_empty_data();
        payload.append_empty_data();
        let sighash = keccak256(&payload.out());

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&signature.r);
        compact[32..].copy_from_slice(&signature.s);
        let rec_id = RecoveryId::try_from(signature.recovery_id()?)?;
        let rec_sig = RecoverableSignature::from_compact(&compact, rec_id)?;
        let public_key = self.secp.recover_ecdsa(Message::from_digest(sighash), &rec_sig)?;
        Ok(KeyManager::address_from_public_key(&public_key))
    }

    /// Calculate the v value for Ethereum signatures
    fn calculate_v_eip155(rec_id: RecoveryId, chain_id: u64) -> u64 {
        let rec_num: i32 = i32::from(rec_id);
        (rec_num as u64) + 35 + 2 * chain_id
    }
}

/// RLP-ready fields shared by the signing payload and the signed transaction
struct LegacyFields {
    nonce: u64,
    gas_price: u64,
    gas_limit: u64,
    to: Vec<u8>,
    value: Vec<u8>,
}

impl LegacyFields {
    fn from_unsigned(tx: &UnsignedTransaction) -> WalletResult<Self> {
        let to = hex::decode(tx.to.trim_start_matches("0x"))
            .map_err(|_| WalletError::validation("Invalid to address"))?;
        if to.len() != 20 {
            return Err(WalletError::validation("Invalid to address"));
        }
        Ok(Self {
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to,
            value: u256_to_bytes_be(tx.value),
        })
    }

    fn append_common(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas_limit);
        s.append(&self.to.as_slice());
        s.append(&self.value.as_slice());
        s.append_empty_data(); // data
    }

    // Signing payload per EIP-155
    fn signing_payload(&self, chain_id: u64) -> Vec<u8> {
        let mut s = RlpStream::new_list(9);
        self.append_common(&mut s);
        s.append(&chain_id);
        s.append_empty_data();
        s.append_empty_data();
        s.out().to_vec()
    }

    fn signed_payload(&self, signature: &TransactionSignature) -> Vec<u8> {
        let mut s = RlpStream::new_list(9);
        self.append_common(&mut s);
        s.append(&signature.v);
        // r and s are integers, so leading zeros are stripped
        s.append(&trim_leading_zeros(&signature.r));
        s.append(&trim_leading_zeros(&signature.s));
        s.out().to_vec()
    }
}

fn u256_to_bytes_be(val: U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    val.to_big_endian(&mut buf);
    trim_leading_zeros(&buf).to_vec()
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first_non_zero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first_non_zero..]
}

fn left_pad_32(bytes: &[u8]) -> WalletResult<[u8; 32]> {
    if bytes.len() > 32 {
        return Err(WalletError::crypto("Signature component longer than 32 bytes"));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

fn be_bytes_to_u64(bytes: &[u8]) -> WalletResult<u64> {
    if bytes.len() > 8 {
        return Err(WalletError::crypto("v does not fit in 64 bits"));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

fn decode_error(err: rlp::DecoderError) -> WalletError {
    WalletError::crypto(format!("RLP decode error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const KEY_ONE_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    fn unsigned(chain_id: u64) -> UnsignedTransaction {
        UnsignedTransaction {
            from: KEY_ONE_ADDRESS.to_string(),
            to: "0x3535353535353535353535353535353535353535".to_string(),
            value: U256::exp10(18),
            gas_limit: 21000,
            gas_price: 20_000_000_000,
            nonce: 9,
            chain_id,
        }
    }

    #[test]
    fn test_eip155_reference_vector() {
        // Example from the EIP-155 text: key 0x4646..46, nonce 9, 20 gwei, 21000 gas,
        // 1 ether to 0x3535..35 on chain 1
        let key = SecurePrivateKey::from_hex(&"46".repeat(32)).unwrap();
        let mut tx = unsigned(1);
        tx.from = KeyManager::new().get_address(&key).unwrap();

        let signed = SignatureManager::new().sign_legacy_transaction(&tx, &key).unwrap();
        assert_eq!(
            signed.raw_hex(),
            "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
    }

    #[test]
    fn test_signature_recovers_sender() {
        let manager = SignatureManager::new();
        let key = SecurePrivateKey::from_hex(KEY_ONE).unwrap();
        for chain_id in [1u64, 56, 11155111] {
            let signed = manager.sign_legacy_transaction(&unsigned(chain_id), &key).unwrap();
            assert_eq!(manager.recover_sender(&signed.raw).unwrap(), KEY_ONE_ADDRESS);
        }
    }

    #[test]
    fn test_hash_is_keccak_of_raw() {
        let key = SecurePrivateKey::from_hex(KEY_ONE).unwrap();
        let signed = SignatureManager::new().sign_legacy_transaction(&unsigned(1), &key).unwrap();
        assert_eq!(signed.hash, format!("0x{}", hex::encode(keccak256(&signed.raw))));
        assert_eq!(signed.nonce, 9);
    }

    #[test]
    fn test_rejects_bad_recipient() {
        let key = SecurePrivateKey::from_hex(KEY_ONE).unwrap();
        let mut tx = unsigned(1);
        tx.to = "0x1234".to_string();
        let result = SignatureManager::new().sign_legacy_transaction(&tx, &key);
        assert!(matches!(result, Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_recover_rejects_garbage() {
        assert!(SignatureManager::new().recover_sender(&[0xc0]).is_err());
    }

    #[test]
    fn test_zero_value_encodes_as_empty() {
        assert!(u256_to_bytes_be(U256::zero()).is_empty());
        assert_eq!(u256_to_bytes_be(U256::from(0x0100u64)), vec![0x01, 0x00]);
    }
}
