//! Hand-written fakes of the remote services, shared by unit tests

use crate::core::crypto::password::PasswordConfig;
use crate::core::crypto::encryption::{EncryptionAlgorithm, PassphraseCipher};
use crate::domain::repositories::{ChainClient, KeySource, WalletRegistration, WalletRegistry};
use crate::shared::error::WalletError;
use crate::shared::types::{Balance, EncryptedKey, GasEstimateRequest, TransactionRecord};
use crate::shared::WalletResult;
use async_trait::async_trait;
use ethers::types::U256;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Fast parameters so tests do not pay for a production KDF
pub fn test_cipher() -> PassphraseCipher {
    PassphraseCipher::new(PasswordConfig::pbkdf2(1000), EncryptionAlgorithm::AES256GCM)
}

/// Records registrations; fails every call with `error` when set
#[derive(Default)]
pub struct RecordingRegistry {
    pub created: Mutex<Vec<WalletRegistration>>,
    pub imported: Mutex<Vec<WalletRegistration>>,
    pub error: Option<WalletError>,
}

impl RecordingRegistry {
    pub fn failing(error: WalletError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    fn check(&self) -> WalletResult<()> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub fn calls(&self) -> usize {
        self.created.lock().unwrap().len() + self.imported.lock().unwrap().len()
    }
}

#[async_trait]
impl WalletRegistry for RecordingRegistry {
    async fn create_wallet(&self, registration: &WalletRegistration) -> WalletResult<()> {
        self.created.lock().unwrap().push(registration.clone());
        self.check()
    }

    async fn import_wallet(&self, registration: &WalletRegistration) -> WalletResult<()> {
        self.imported.lock().unwrap().push(registration.clone());
        self.check()
    }

    async fn balance(&self, _address: &str) -> WalletResult<Balance> {
        self.check()?;
        Ok("1.25".to_string())
    }

    async fn transactions(&self) -> WalletResult<Vec<TransactionRecord>> {
        self.check()?;
        Ok(Vec::new())
    }
}

/// Chain state with per-method call counters and an optional failing method
pub struct FakeChain {
    pub nonce: u64,
    pub gas_price: u64,
    pub gas_estimate: u64,
    pub fail_on: Option<&'static str>,
    pub nonce_calls: AtomicUsize,
    pub gas_price_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    pub last_estimate: Mutex<Option<GasEstimateRequest>>,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self {
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_estimate: 21_000,
            fail_on: None,
            nonce_calls: AtomicUsize::new(0),
            gas_price_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            last_estimate: Mutex::new(None),
        }
    }
}

impl FakeChain {
    pub fn failing_on(method: &'static str) -> Self {
        Self {
            fail_on: Some(method),
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.nonce_calls.load(Ordering::SeqCst)
            + self.gas_price_calls.load(Ordering::SeqCst)
            + self.estimate_calls.load(Ordering::SeqCst)
    }

    fn fail(&self, method: &str) -> WalletResult<()> {
        if self.fail_on == Some(method) {
            return Err(WalletError::network(format!("{} timed out", method)));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn transaction_count(&self, _address: &str) -> WalletResult<u64> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        self.fail("eth_getTransactionCount")?;
        Ok(self.nonce)
    }

    async fn gas_price(&self) -> WalletResult<u64> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        self.fail("eth_gasPrice")?;
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> WalletResult<u64> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_estimate.lock().unwrap() = Some(request.clone());
        self.fail("eth_estimateGas")?;
        Ok(self.gas_estimate)
    }

    async fn balance(&self, _address: &str) -> WalletResult<U256> {
        Ok(U256::exp10(18))
    }
}

/// Key source answering with a fixed result and counting requests
pub struct StaticKeySource {
    pub key: WalletResult<Option<EncryptedKey>>,
    pub calls: AtomicUsize,
}

impl StaticKeySource {
    pub fn new(key: WalletResult<Option<EncryptedKey>>) -> Self {
        Self {
            key,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn encrypted_key(&self, _address: &str) -> WalletResult<Option<EncryptedKey>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.key.clone()
    }
}
