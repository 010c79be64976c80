//! CoinVault command-line client
//!
//! Sign in, manage accounts, send ether and look at market data from a terminal.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use coinvault_wallet_core::core::pricing::{
    value_portfolio, BuyCalculator, Holding, LocalCurrencyHook, MarketSort, MarketStats, SwapQuote,
};
use coinvault_wallet_core::core::session::Session;
use coinvault_wallet_core::infrastructure::init_logging;
use coinvault_wallet_core::shared::constants::MARKET_LISTING_SIZE;
use coinvault_wallet_core::shared::utils::{format_address, format_large_number, format_price};
use coinvault_wallet_core::{WalletConfig, WalletCore, SUPPORTED_ASSETS};
use std::path::PathBuf;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "coinvault")]
#[command(version)]
#[command(about = "CoinVault wallet client", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./coinvault.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the configured one
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the CoinVault backend
    Login {
        #[arg(short, long)]
        email: String,
    },

    /// Create a CoinVault account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Create a new wallet account
    Create,

    /// Import a private key or seed phrase (prompted), or watch an address
    Import {
        /// Address to add as watch-only
        #[arg(long)]
        watch: Option<String>,
    },

    /// Show an account balance
    Balance {
        address: String,

        /// Ask the chain node instead of the backend
        #[arg(long)]
        chain: bool,
    },

    /// Registry transaction history
    History,

    /// Send ether
    Send {
        #[arg(short, long)]
        from: String,

        #[arg(short, long)]
        to: String,

        /// Amount in ether, e.g. 0.05
        #[arg(short, long)]
        amount: String,
    },

    /// Current prices of the supported assets
    Prices,

    /// Top coins by market cap
    Markets {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[arg(short, long, value_enum, default_value_t = SortKey::MarketCap)]
        sort: SortKey,
    },

    /// USD value of an address's ether on chain
    Portfolio { address: String },

    /// USD to local currency exchange rate
    Rate,

    /// Quote a swap between two supported assets
    SwapQuote {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(short, long)]
        amount: f64,

        /// Amount of `from` currently held
        #[arg(short, long)]
        balance: f64,
    },

    /// Quote buying an asset for an amount of USD
    BuyQuote {
        symbol: String,

        #[arg(short, long)]
        usd: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortKey {
    MarketCap,
    Price,
    Change,
    Volume,
}

impl From<SortKey> for MarketSort {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::MarketCap => MarketSort::MarketCap,
            SortKey::Price => MarketSort::Price,
            SortKey::Change => MarketSort::Change24h,
            SortKey::Volume => MarketSort::Volume,
        }
    }
}

fn prompt_secret(label: &str) -> anyhow::Result<Zeroizing<String>> {
    let value = rpassword::prompt_password(label).context("Password prompt failed")?;
    Ok(Zeroizing::new(value))
}

fn prompt_new_passphrase() -> anyhow::Result<Zeroizing<String>> {
    let passphrase = prompt_secret("New wallet passphrase: ")?;
    let confirm = prompt_secret("Repeat passphrase: ")?;
    if *passphrase != *confirm {
        bail!("Passphrases do not match");
    }
    Ok(passphrase)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<WalletConfig> {
    let config = match path {
        Some(path) => {
            dotenv::dotenv().ok();
            WalletConfig::load_from(Some(path))?
        }
        None => WalletConfig::load()?,
    };
    Ok(config)
}

/// Restored session, failing early when nobody is signed in
fn signed_in(core: &WalletCore) -> anyhow::Result<Session> {
    let mut session = core.new_session();
    if !session.restore()? {
        bail!("Not signed in. Run `coinvault login` first");
    }
    Ok(session)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let core = WalletCore::from_config(config)?;

    match cli.command {
        Commands::Login { email } => {
            let password = prompt_secret("Password: ")?;
            let mut session = core.new_session();
            let user = session.login(&email, &password).await?;
            println!("Signed in as {}", user.full_name.as_deref().unwrap_or(&user.email));
        }
        Commands::Register { name, email } => {
            let password = prompt_secret("Password: ")?;
            let confirm = prompt_secret("Confirm password: ")?;
            let mut session = core.new_session();
            let user = session.register(&name, &email, &password, &confirm).await?;
            println!("Welcome, {}", user.full_name.as_deref().unwrap_or(&user.email));
        }
        Commands::Logout => {
            core.new_session().logout()?;
            println!("Signed out");
        }
        Commands::Whoami => {
            let mut session = signed_in(&core)?;
            let user = session.verify().await?;
            println!("{} <{}>", user.full_name.as_deref().unwrap_or("-"), user.email);
            if let Some(address) = &user.wallet_address {
                println!("Wallet {}", address);
            }
        }
        Commands::Create => {
            signed_in(&core)?;
            let passphrase = prompt_new_passphrase()?;
            let created = core.accounts().create_account(&passphrase).await?;
            println!("Created {}", created.account.address());
            println!("\nWrite down this recovery phrase. It will not be shown again:\n");
            println!("  {}\n", created.seed_phrase.as_str());
        }
        Commands::Import { watch } => {
            signed_in(&core)?;
            let account = match watch {
                Some(address) => core.accounts().import_account(&address, "").await?,
                None => {
                    let secret = prompt_secret("Private key or recovery phrase: ")?;
                    let passphrase = prompt_new_passphrase()?;
                    if secret.trim().contains(char::is_whitespace) {
                        core.accounts().import_mnemonic(&secret, &passphrase).await?
                    } else {
                        core.accounts().import_account(&secret, &passphrase).await?
                    }
                }
            };
            let kind = if account.is_watch_only() { "watch-only" } else { "spendable" };
            println!("Imported {} ({})", account.address(), kind);
        }
        Commands::Balance { address, chain } => {
            let balance = if chain {
                core.chain_balance(&address).await?
            } else {
                signed_in(&core)?;
                core.accounts().balance(&address).await?
            };
            println!("{} ETH", balance);
        }
        Commands::History => {
            signed_in(&core)?;
            let records = core.accounts().transactions().await?;
            if records.is_empty() {
                println!("No transactions yet");
            }
            for record in records {
                println!(
                    "{:<10} {:<21} -> {:<21} {:>14} {}",
                    record.kind.as_deref().unwrap_or("-"),
                    format_address(record.from.as_deref().unwrap_or("")),
                    format_address(record.to.as_deref().unwrap_or("")),
                    record.amount.map(|a| a.to_string()).unwrap_or_default(),
                    record.status.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Send { from, to, amount } => {
            signed_in(&core)?;
            let passphrase = prompt_secret("Wallet passphrase: ")?;
            let timeout = core.config().send_timeout();
            let outcome = tokio::time::timeout(timeout, core.pipeline().send(&from, &to, &amount, &passphrase))
                .await
                .with_context(|| format!("Send did not finish within {}s", timeout.as_secs()))?;

            let trail: Vec<String> = outcome.trail.iter().map(|s| s.to_string()).collect();
            log::debug!("Send {} went {}", outcome.flow_id, trail.join(" -> "));
            let failed_at = outcome.failed_at;
            match outcome.into_result() {
                Ok(receipt) => println!("Sent. Transaction hash {}", receipt.tx_hash),
                Err(e) => match failed_at {
                    Some(state) => bail!("Send failed at {}: {}", state, e.message()),
                    None => bail!("Send failed: {}", e.message()),
                },
            }
        }
        Commands::Prices => {
            let mut session = core.new_session();
            let prices = session.refresh_prices(SUPPORTED_ASSETS).await;
            for (symbol, quote) in prices.iter() {
                println!("{:<6} {:>16}  {}", symbol, format_price(quote.usd), quote.source);
            }
            if prices.has_fallback() {
                println!("\nSome prices are fallback values and may be out of date.");
            }
        }
        Commands::Markets { limit, sort } => {
            let mut entries = core.markets().fetch_markets(MARKET_LISTING_SIZE).await?;
            let stats = MarketStats::from_entries(&entries);
            MarketSort::from(sort).sort(&mut entries);

            println!(
                "Market cap ${}  Volume ${}  BTC dominance {:.1}%\n",
                format_large_number(stats.total_market_cap),
                format_large_number(stats.total_volume),
                stats.btc_dominance
            );
            for entry in entries.iter().take(limit) {
                println!(
                    "{:<6} {:<20} {:>16} {:>8}",
                    entry.symbol.to_uppercase(),
                    entry.name,
                    format_price(entry.current_price.unwrap_or(0.0)),
                    entry
                        .price_change_percentage_24h
                        .map(|c| format!("{:+.2}%", c))
                        .unwrap_or_default()
                );
            }
        }
        Commands::Portfolio { address } => {
            let ether: f64 = core
                .chain_balance(&address)
                .await?
                .parse()
                .context("Unexpected balance format")?;
            let mut session = core.new_session();
            let prices = session.refresh_prices(SUPPORTED_ASSETS).await;
            let portfolio = value_portfolio(&[Holding::new("ETH", ether)], prices);
            for line in &portfolio.lines {
                println!(
                    "{:<6} {:>14} x {:>14} = {}",
                    line.symbol,
                    line.balance,
                    format_price(line.usd_price),
                    format_price(line.usd_value)
                );
            }
            println!("Total {}", format_price(portfolio.total_usd));
        }
        Commands::Rate => {
            let mut session = core.new_session();
            let rate = session.refresh_exchange_rate().await?;
            println!("1 {} = {:.4} {} ({})", rate.base, rate.rate, rate.quote, rate.source);
        }
        Commands::SwapQuote {
            from,
            to,
            amount,
            balance,
        } => {
            let mut session = core.new_session();
            let prices = session.refresh_prices(SUPPORTED_ASSETS).await;
            let quote = SwapQuote::calculate(&from, &to, amount, balance, prices)?;
            println!("1 {} = {:.8} {}", quote.from_symbol, quote.rate, quote.to_symbol);
            println!("Fee      {:.8} {}", quote.fee, quote.to_symbol);
            println!("Receive  {:.8} {}", quote.receive_amount, quote.to_symbol);
            if prices.has_fallback() {
                println!("\nQuote uses fallback prices and may be out of date.");
            }
        }
        Commands::BuyQuote { symbol, usd } => {
            let mut session = core.new_session();
            let rate = session.refresh_exchange_rate().await?.clone();
            let prices = session.refresh_prices(SUPPORTED_ASSETS).await;

            let mut calculator = BuyCalculator::new();
            calculator.register(Box::new(LocalCurrencyHook::new(rate)));
            let quote = calculator.calculate(&symbol, usd, prices)?;
            println!("{} buys {:.8} {}", format_price(quote.usd_amount), quote.crypto_amount, quote.symbol);
            if let Some(local) = quote.local {
                println!("Pay {:.2} {}", local.amount, local.currency);
            }
            if prices.has_fallback() {
                println!("\nQuote uses fallback prices and may be out of date.");
            }
        }
    }

    Ok(())
}
