use crate::shared::error::WalletError;
use crate::shared::WalletResult;

/// EIP-155 signature components of a legacy transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u64,
}

impl TransactionSignature {
    /// Chain id folded into `v` (`v = recid + 35 + 2 * chain_id`)
    pub fn chain_id(&self) -> WalletResult<u64> {
        if self.v < 35 {
            return Err(WalletError::crypto(format!("v = {} is not an EIP-155 value", self.v)));
        }
        Ok((self.v - 35) / 2)
    }

    pub fn recovery_id(&self) -> WalletResult<i32> {
        if self.v < 35 {
            return Err(WalletError::crypto(format!("v = {} is not an EIP-155 value", self.v)));
        }
        Ok(((self.v - 35) % 2) as i32)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}{}{:02x}", hex::encode(self.r), hex::encode(self.s), self.v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eip155_components() {
        let mainnet = TransactionSignature { r: [1; 32], s: [2; 32], v: 38 };
        assert_eq!(mainnet.chain_id().unwrap(), 1);
        assert_eq!(mainnet.recovery_id().unwrap(), 1);

        let sepolia = TransactionSignature { r: [1; 32], s: [2; 32], v: 11155111 * 2 + 35 };
        assert_eq!(sepolia.chain_id().unwrap(), 11155111);
        assert_eq!(sepolia.recovery_id().unwrap(), 0);
    }

    #[test]
    fn test_pre_eip155_v_is_rejected() {
        let legacy = TransactionSignature { r: [1; 32], s: [2; 32], v: 27 };
        assert!(legacy.chain_id().is_err());
    }

    #[test]
    fn test_to_hex() {
        let signature = TransactionSignature { r: [0xab; 32], s: [0xcd; 32], v: 37 };
        let hex = signature.to_hex();
        assert!(hex.starts_with("0xabab"));
        assert!(hex.ends_with("cdcd25"));
    }
}
