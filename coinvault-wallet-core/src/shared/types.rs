use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Basic types for wallet operations
pub type Address = String;
pub type TransactionHash = String;
pub type GasPrice = u64;
pub type GasLimit = u64;
pub type Balance = String;
/// Opaque passphrase-encrypted ciphertext as stored by the registry
pub type EncryptedKey = String;

/// A transfer with every field resolved from network state, ready to sign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub from: Address,
    pub to: Address,
    /// Value in wei
    pub value: U256,
    pub gas_limit: GasLimit,
    pub gas_price: GasPrice,
    pub nonce: u64,
    pub chain_id: u64,
}

impl UnsignedTransaction {
    /// Upper bound on the fee paid for this transfer, in wei
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.gas_price)
    }

    /// Value plus maximum fee, in wei
    pub fn total_cost(&self) -> U256 {
        self.value.saturating_add(self.max_fee())
    }
}

/// Raw signed transaction bytes plus their keccak-256 hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub from: Address,
    pub nonce: u64,
    pub raw: Vec<u8>,
    pub hash: TransactionHash,
}

impl SignedTransaction {
    /// `0x`-prefixed hex of the raw RLP bytes, the form broadcasters accept
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    pub tx_hash: TransactionHash,
}

/// Parameters of an `eth_estimateGas` call for a plain value transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimateRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// Authenticated user as returned by the auth API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub email: String,
    pub wallet_address: Option<Address>,
    pub wallet_balance: Option<f64>,
}

/// Bearer token plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Entry of the registry's transaction history; the server owns the shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    #[serde(alias = "txHash")]
    pub hash: Option<TransactionHash>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: Option<serde_json::Value>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

// Result types for better error handling
pub type WalletResult<T> = Result<T, crate::shared::error::WalletError>;
