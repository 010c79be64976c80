//! Constants for the wallet core
//!
//! This module contains all constants used throughout the wallet core.

// Security constants
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 65;
pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const SALT_SIZE: usize = 16;
pub const LEGACY_SALT_SIZE: usize = 8;

// Cryptographic constants
pub const ARGON2_MEMORY_COST: u32 = 65536; // 64MB
pub const ARGON2_TIME_COST: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 1;
pub const PBKDF2_ITERATIONS: u32 = 100000;

// Upper bounds on KDF cost read back from an envelope
pub const MAX_ARGON2_MEMORY_COST: u32 = 1_048_576; // 1GB
pub const MAX_ARGON2_TIME_COST: u32 = 10;
pub const MAX_ARGON2_PARALLELISM: u32 = 16;
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

// Envelope format
pub const ENVELOPE_VERSION: &str = "cv1";
/// base64 of "Salted__", the prefix of CryptoJS/OpenSSL passphrase ciphertexts
pub const LEGACY_CIPHERTEXT_PREFIX: &str = "U2FsdGVkX1";
pub const LEGACY_SALT_HEADER: &[u8] = b"Salted__";

// Validation constants
pub const ADDRESS_LENGTH: usize = 42; // 0x + 40 hex chars
pub const PRIVATE_KEY_HEX_LENGTH: usize = 64;
pub const PREFIXED_PRIVATE_KEY_LENGTH: usize = 66; // 0x + 64 hex chars
pub const MNEMONIC_ENTROPY_SIZE: usize = 16; // 12 words
pub const ETHEREUM_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";
pub const MIN_ACCOUNT_PASSWORD_LENGTH: usize = 6;
pub const MIN_FULL_NAME_LENGTH: usize = 2;
pub const ETHER_DECIMALS: u32 = 18;

// Network defaults
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";
pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 120;

// Session storage keys
pub const TOKEN_STORAGE_KEY: &str = "token";
pub const USER_STORAGE_KEY: &str = "user";
pub const EXCHANGE_RATE_STORAGE_KEY: &str = "exchangeRate";
pub const SESSION_FILE_NAME: &str = "session.json";
pub const APP_DIR_NAME: &str = "coinvault";

// Pricing
pub const DEFAULT_LOCAL_CURRENCY: &str = "GHS";
pub const DEFAULT_EXCHANGE_RATE: f64 = 15.0;
pub const EXCHANGE_RATE_TTL_HOURS: i64 = 24;
pub const PRICE_REFRESH_INTERVAL_SECS: u64 = 60;
pub const SWAP_FEE_RATE: f64 = 0.003;
pub const MARKET_LISTING_SIZE: usize = 50;

pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const COINBASE_API_URL: &str = "https://api.coinbase.com/v2";
pub const CRYPTOCOMPARE_API_URL: &str = "https://min-api.cryptocompare.com/data";
pub const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";
pub const EXCHANGERATE_HOST_URL: &str = "https://api.exchangerate.host";
pub const OPEN_ER_API_URL: &str = "https://open.er-api.com/v6";

// Build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
