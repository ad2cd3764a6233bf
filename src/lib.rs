//! SuiWal Swap: SUI -> WAL conversion core
//!
//! This crate provides everything a swap front end needs apart from
//! rendering and key custody: balance reads over Sui JSON-RPC, rate and USD
//! price lookups, assembly of the single exchange transaction, and the
//! polling/session machinery that keeps a swap screen current.
//!
//! # Architecture
//!
//! - **Exchange Hook**: balance reads and the split → exchange → transfer transaction
//! - **Price Service**: WAL-per-SUI rate and USD prices from DexScreener
//! - **Polling**: generation-guarded periodic tasks that drop late results
//! - **Swap Session**: intent, derived receive amount, status cycle and retry
//!
//! Signing is always delegated to the wallet through the [`Signer`] trait.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use suiwal_swap::{ExchangeHook, Network, SuiRpcClient, WalletConnection};
//!
//! let connection = WalletConnection::new();
//! connection.connect("0x...".parse()?);
//!
//! let hook = ExchangeHook::new(
//!     Network::Testnet,
//!     connection,
//!     Arc::new(SuiRpcClient::new(Network::Testnet.fullnode_url())?),
//!     Arc::new(my_wallet_signer),
//! );
//!
//! let sui = hook.get_sui_balance(None).await?;
//! let result = hook.convert_sui_to_wal(5_000_000_000).await?;
//! println!("digest: {}", result.digest);
//! ```

// Public modules
pub mod account;
pub mod config;
pub mod error;
pub mod exchange;
pub mod intent;
pub mod network;
pub mod polling;
pub mod price;
pub mod rpc;
pub mod session;
pub mod settings;
pub mod signer;
pub mod transaction;
pub mod units;

// Re-exports for convenience
pub use account::{Account, SuiAddress, WalletConnection};
pub use config::SwapConfig;
pub use error::{SignerError, StorageError, SwapError};
pub use exchange::{build_exchange_transaction, ExchangeHook, WalBalance};
pub use intent::{derive_receive_amount, SwapIntent, Token};
pub use network::{ExchangeDeployment, Network, SUI_COIN_TYPE};
pub use polling::{
    spawn_balance_poller, spawn_price_poller, BalanceSnapshot, PeriodicTask, PollHandle,
    RateRefresher, Relevance, Ticket,
};
pub use price::{DexScreenerClient, PriceQuote, PriceService, PriceSource, TokenPair};
pub use rpc::{Balance, BalanceReader, SuiRpcClient};
pub use session::{SessionState, SessionTimings, SwapSession, SwapStatus};
pub use settings::{FilePreferences, MemoryPreferences, PreferencePort, Preferences, SettingsStore, Theme};
pub use signer::{DetachedSigner, ExecuteRequest, ExecutionResult, Signer};
pub use transaction::{ExecuteOptions, TransactionBuilder, TransactionData};

// Common result type
pub type Result<T> = std::result::Result<T, SwapError>;
