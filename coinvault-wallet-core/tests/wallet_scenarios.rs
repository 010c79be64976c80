//! End-to-end wallet scenarios over in-memory fakes of the backend and chain

use async_trait::async_trait;
use coinvault_wallet_core::core::crypto::{EncryptionAlgorithm, PasswordConfig, SignatureManager};
use coinvault_wallet_core::core::pricing::{
    ExchangeRateService, FallbackPolicy, PriceFeed, SwapQuote,
};
use coinvault_wallet_core::core::session::Session;
use coinvault_wallet_core::core::transactions::{
    SendPipeline, SendState, SubmissionRelay, TransactionBuilder, TransactionSigner,
};
use coinvault_wallet_core::core::wallet::AccountManager;
use coinvault_wallet_core::domain::repositories::{
    AuthService, Broadcaster, ChainClient, LoginRequest, RegisterRequest, WalletRegistration, WalletRegistry,
};
use coinvault_wallet_core::infrastructure::FileSessionStorage;
use coinvault_wallet_core::shared::types::{AuthSession, Balance, GasEstimateRequest, TransactionRecord, User};
use coinvault_wallet_core::shared::utils::same_address;
use coinvault_wallet_core::{PassphraseCipher, WalletError, WalletResult, SUPPORTED_ASSETS};
use ethers::types::U256;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const PASSPHRASE: &str = "correct horse battery";
const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

fn cipher() -> PassphraseCipher {
    PassphraseCipher::new(PasswordConfig::pbkdf2(1000), EncryptionAlgorithm::AES256GCM)
}

#[derive(Default)]
struct Registry {
    registered: Mutex<Vec<WalletRegistration>>,
}

#[async_trait]
impl WalletRegistry for Registry {
    async fn create_wallet(&self, registration: &WalletRegistration) -> WalletResult<()> {
        self.registered.lock().unwrap().push(registration.clone());
        Ok(())
    }

    async fn import_wallet(&self, registration: &WalletRegistration) -> WalletResult<()> {
        self.registered.lock().unwrap().push(registration.clone());
        Ok(())
    }

    async fn balance(&self, _address: &str) -> WalletResult<Balance> {
        Ok("0".to_string())
    }

    async fn transactions(&self) -> WalletResult<Vec<TransactionRecord>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct Chain {
    calls: AtomicUsize,
}

#[async_trait]
impl ChainClient for Chain {
    async fn transaction_count(&self, _address: &str) -> WalletResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(3)
    }

    async fn gas_price(&self) -> WalletResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(30_000_000_000)
    }

    async fn estimate_gas(&self, _request: &GasEstimateRequest) -> WalletResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(21_000)
    }

    async fn balance(&self, _address: &str) -> WalletResult<U256> {
        Ok(U256::zero())
    }
}

#[derive(Default)]
struct CapturingBroadcaster {
    raw: Mutex<Vec<String>>,
}

#[async_trait]
impl Broadcaster for CapturingBroadcaster {
    fn name(&self) -> &'static str {
        "capture"
    }

    async fn broadcast_raw(&self, raw_hex: &str) -> WalletResult<Option<String>> {
        self.raw.lock().unwrap().push(raw_hex.to_string());
        Ok(None)
    }
}

#[tokio::test]
async fn create_then_send_reaches_done() {
    let registry = Arc::new(Registry::default());
    let accounts = AccountManager::new(registry.clone(), cipher());
    let created = accounts.create_account(PASSPHRASE).await.unwrap();
    assert_eq!(created.seed_phrase.word_count(), 12);

    // the registry received ciphertext, never the key
    let registration = registry.registered.lock().unwrap()[0].clone();
    assert!(same_address(&registration.wallet_address, created.account.address()));
    assert!(registration.client_encrypted_private_key.unwrap().starts_with("$cv1$"));

    let chain = Arc::new(Chain::default());
    let broadcaster = Arc::new(CapturingBroadcaster::default());
    let pipeline = SendPipeline::new(
        Arc::new(created.account.clone()),
        TransactionBuilder::new(chain.clone(), 1),
        TransactionSigner::new(cipher()),
        SubmissionRelay::new(broadcaster.clone()),
    );

    let outcome = pipeline
        .send(created.account.address(), RECIPIENT, "0.25", PASSPHRASE)
        .await;
    assert_eq!(outcome.final_state(), SendState::Done);
    let receipt = outcome.into_result().unwrap();
    assert!(receipt.tx_hash.starts_with("0x"));
    assert_eq!(chain.calls.load(Ordering::SeqCst), 3);

    let raw_hex = broadcaster.raw.lock().unwrap()[0].clone();
    let raw = hex::decode(raw_hex.trim_start_matches("0x")).unwrap();
    let sender = SignatureManager::new().recover_sender(&raw).unwrap();
    assert!(same_address(&sender, created.account.address()));
}

#[tokio::test]
async fn wrong_passphrase_never_reaches_the_network() {
    let accounts = AccountManager::new(Arc::new(Registry::default()), cipher());
    let created = accounts.create_account(PASSPHRASE).await.unwrap();

    let chain = Arc::new(Chain::default());
    let broadcaster = Arc::new(CapturingBroadcaster::default());
    let pipeline = SendPipeline::new(
        Arc::new(created.account.clone()),
        TransactionBuilder::new(chain.clone(), 1),
        TransactionSigner::new(cipher()),
        SubmissionRelay::new(broadcaster.clone()),
    );

    let outcome = pipeline
        .send(created.account.address(), RECIPIENT, "0.25", "not the passphrase")
        .await;
    assert_eq!(outcome.failed_at, Some(SendState::KeyRequested));
    assert!(outcome.into_result().unwrap_err().is_auth_failure());
    assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
    assert!(broadcaster.raw.lock().unwrap().is_empty());
}

#[tokio::test]
async fn watch_only_account_cannot_send() {
    let accounts = AccountManager::new(Arc::new(Registry::default()), cipher());
    let watched = accounts.import_account(RECIPIENT, "").await.unwrap();
    assert!(watched.is_watch_only());

    let pipeline = SendPipeline::new(
        Arc::new(watched.clone()),
        TransactionBuilder::new(Arc::new(Chain::default()), 1),
        TransactionSigner::new(cipher()),
        SubmissionRelay::new(Arc::new(CapturingBroadcaster::default())),
    );
    let outcome = pipeline
        .send(RECIPIENT, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94", "1", PASSPHRASE)
        .await;
    assert!(matches!(outcome.result, Err(WalletError::MissingKey(_))));
}

struct Auth;

#[async_trait]
impl AuthService for Auth {
    async fn login(&self, request: &LoginRequest) -> WalletResult<AuthSession> {
        Ok(AuthSession {
            token: "jwt".to_string(),
            user: User {
                id: None,
                full_name: Some("Kofi Boateng".to_string()),
                email: request.email().to_string(),
                wallet_address: None,
                wallet_balance: None,
            },
        })
    }

    async fn register(&self, _request: &RegisterRequest) -> WalletResult<AuthSession> {
        Err(WalletError::server_rejected(Some("User already exists".to_string())))
    }

    async fn me(&self, _token: &str) -> WalletResult<User> {
        Err(WalletError::network("offline"))
    }
}

fn offline_session(storage: Arc<FileSessionStorage>) -> Session {
    let defaults = SUPPORTED_ASSETS
        .iter()
        .map(|asset| (asset.symbol.to_string(), asset.fallback_price))
        .collect();
    Session::new(
        Arc::new(Auth),
        storage,
        PriceFeed::new(Vec::new()),
        FallbackPolicy::new(defaults),
        ExchangeRateService::new(Vec::new(), "GHS", 24, 15.0),
    )
}

#[tokio::test]
async fn session_survives_restart_through_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut first = offline_session(Arc::new(FileSessionStorage::new(&path)));
    first.login("kofi@example.com", "secret1").await.unwrap();
    let rejected = first.register("Kofi", "kofi@example.com", "secret1", "secret1").await;
    assert_eq!(rejected.unwrap_err().message(), "User already exists");
    drop(first);

    let mut second = offline_session(Arc::new(FileSessionStorage::new(&path)));
    assert!(second.restore().unwrap());
    assert_eq!(second.user().unwrap().email, "kofi@example.com");

    // a network failure while verifying keeps the session
    assert!(second.verify().await.unwrap_err().is_network_unavailable());
    assert!(second.is_authenticated());
}

#[tokio::test]
async fn offline_prices_fall_back_and_still_quote() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = offline_session(Arc::new(FileSessionStorage::new(dir.path().join("s.json"))));

    let prices = session.refresh_prices(SUPPORTED_ASSETS).await;
    assert_eq!(prices.len(), SUPPORTED_ASSETS.len());
    assert!(prices.iter().all(|(_, quote)| quote.source.is_fallback()));

    let quote = SwapQuote::calculate("USDT", "USDT", 1.0, 1.0, prices);
    assert!(quote.is_err());
    let quote = SwapQuote::calculate("USDT", "ETH", 100.0, 150.0, prices).unwrap();
    assert!(quote.receive_amount < quote.from_amount * quote.rate);

    let rate = session.refresh_exchange_rate().await.unwrap();
    assert_eq!(rate.rate, 15.0);
}
