//! Chain Mock Server
//!
//! Serves mocked Sui JSON-RPC balances and DexScreener prices for local
//! development against the swap server.

use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;

use chain_mock::{run_server, MockLedger, MockPrice};

#[derive(Debug)]
struct Config {
    server_host: String,
    server_port: u16,
    // Optional seed prices, as DexScreener strings
    sui_price_usd: Option<String>,
    wal_price_native: Option<String>,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3100".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            server_host,
            server_port,
            sui_price_usd: env::var("MOCK_SUI_PRICE_USD").ok(),
            wal_price_native: env::var("MOCK_WAL_PRICE_NATIVE").ok(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Chain Mock Server...");

    let config = Config::from_env().context("Failed to load configuration")?;
    log::info!(
        "Server will listen on {}:{}",
        config.server_host,
        config.server_port
    );

    let ledger = Arc::new(MockLedger::new());
    if let Some(usd) = config.sui_price_usd {
        ledger.set_price(
            chain_mock::SUI_COIN_TYPE,
            MockPrice {
                price_native: Some("1".to_string()),
                price_usd: Some(usd),
            },
        );
    }
    if let Some(native) = config.wal_price_native {
        log::info!("Seeding WAL price: {} SUI", native);
        ledger.set_price(
            env::var("MOCK_WAL_COIN_TYPE").unwrap_or_else(|_| {
                "0x356a26eb9e012a68958082340d4c4116e7f55615cf27affcff209cf0ae544f59::wal::WAL"
                    .to_string()
            })
            .as_str(),
            MockPrice {
                price_native: Some(native),
                price_usd: None,
            },
        );
    }

    run_server(ledger, config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
