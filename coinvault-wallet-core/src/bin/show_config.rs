use coinvault_wallet_core::infrastructure::config::{CONFIG_FILE_NAME, ENV_PREFIX};
use coinvault_wallet_core::{WalletConfig, NAME, VERSION};

fn main() {
    let config = match WalletConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("{} {} configuration", NAME, VERSION);
    println!("  (defaults < {} < {}_* environment)\n", CONFIG_FILE_NAME, ENV_PREFIX);
    match serde_json::to_string_pretty(&config.summary()) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render configuration: {}", e),
    }

    let mut prices: Vec<_> = config.default_prices.iter().collect();
    prices.sort_by(|a, b| a.0.cmp(b.0));
    println!("\nFallback prices (display only):");
    for (symbol, price) in prices {
        println!("  {:<6} ${}", symbol, price);
    }
}
