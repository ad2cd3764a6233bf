//! Swap configuration from environment variables
//!
//! Controls the Sui network, RPC and price API endpoints, and polling
//! cadence. Defaults to testnet.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SwapError;
use crate::network::Network;
use crate::price::DEXSCREENER_URL;
use crate::session::SessionTimings;

#[derive(Clone, Debug)]
pub struct SwapConfig {
    /// Network used when no stored preference exists
    pub network: Network,
    /// Fullnode JSON-RPC override; `None` uses the network's public fullnode
    pub rpc_url: Option<String>,
    /// Price API base URL
    pub price_api_url: String,
    pub balance_poll_interval: Duration,
    pub price_poll_interval: Duration,
    /// How long a terminal swap status stays visible
    pub status_clear_delay: Duration,
    /// Where preferences are persisted
    pub settings_path: PathBuf,
}

impl SwapConfig {
    /// Load configuration from environment variables (and `.env` if present)
    ///
    /// Environment variables:
    /// - `SUI_NETWORK`: "testnet" (default) or "mainnet"
    /// - `SUI_RPC_URL`: fullnode JSON-RPC endpoint (optional)
    /// - `PRICE_API_URL`: DexScreener-compatible base URL (optional)
    /// - `BALANCE_POLL_SECS`: balance refresh interval, default 10
    /// - `PRICE_POLL_SECS`: USD price refresh interval, default 60
    /// - `STATUS_CLEAR_SECS`: status auto-clear delay, default 5
    /// - `SETTINGS_PATH`: preference file, default `./preferences.json`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Local development against chain-mock
    /// SUI_RPC_URL=http://localhost:4000 PRICE_API_URL=http://localhost:4000 cargo run -p swap-server
    /// ```
    pub fn from_env() -> Result<Self, SwapError> {
        dotenv::dotenv().ok();

        let network = match env::var("SUI_NETWORK") {
            Ok(raw) if !raw.trim().is_empty() => match raw.parse::<Network>() {
                Ok(network) => network,
                Err(_) => {
                    log::warn!("⚠️  Unknown network '{}', defaulting to testnet", raw);
                    Network::Testnet
                }
            },
            _ => Network::Testnet,
        };
        log::info!("🌐 Using {} network", network);

        let rpc_url = env::var("SUI_RPC_URL").ok().filter(|s| !s.trim().is_empty());
        match rpc_url {
            Some(ref url) => log::info!("📡 Sui RPC URL: {}", url),
            None => log::info!("📡 Sui RPC URL: {}", network.fullnode_url()),
        }

        let price_api_url =
            env::var("PRICE_API_URL").unwrap_or_else(|_| DEXSCREENER_URL.to_string());

        let config = Self {
            network,
            rpc_url,
            price_api_url,
            balance_poll_interval: secs_from_env("BALANCE_POLL_SECS", 10)?,
            price_poll_interval: secs_from_env("PRICE_POLL_SECS", 60)?,
            status_clear_delay: secs_from_env("STATUS_CLEAR_SECS", 5)?,
            settings_path: env::var("SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./preferences.json")),
        };

        Ok(config)
    }

    /// RPC endpoint for `network`, honoring the override
    pub fn rpc_url_for(&self, network: Network) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| network.fullnode_url().to_string())
    }

    pub fn session_timings(&self) -> SessionTimings {
        SessionTimings {
            balance_interval: self.balance_poll_interval,
            price_interval: self.price_poll_interval,
            status_clear_delay: self.status_clear_delay,
        }
    }
}

fn secs_from_env(key: &str, default: u64) -> Result<Duration, SwapError> {
    match env::var(key) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| SwapError::Config(format!("{}={}: {}", key, raw, e)))?;
            if secs == 0 {
                return Err(SwapError::Config(format!("{} must be positive", key)));
            }
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

impl Default for SwapConfig {
    /// Default configuration (testnet, public endpoints)
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            rpc_url: None,
            price_api_url: DEXSCREENER_URL.to_string(),
            balance_poll_interval: Duration::from_secs(10),
            price_poll_interval: Duration::from_secs(60),
            status_clear_delay: Duration::from_secs(5),
            settings_path: PathBuf::from("./preferences.json"),
        }
    }
}
