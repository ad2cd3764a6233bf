//! Error types for swap operations
//!
//! Local validation failures (`NotConnected`, `UnsupportedDirection`,
//! `InvalidAmount`, `InsufficientBalance`) are raised before any network
//! call. Wallet-side failures arrive as `RemoteRejected` after the round trip.
//! Missing price data is never an error; it degrades to a zero value.

use thiserror::Error;

use crate::intent::Token;
use crate::network::Network;

/// Core error type for swap operations
#[derive(Error, Debug)]
pub enum SwapError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("Unsupported swap direction: {from} -> {to}")]
    UnsupportedDirection { from: Token, to: Token },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: requested {requested} MIST, available {available} MIST")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("Transaction rejected: {0}")]
    RemoteRejected(#[from] SignerError),

    #[error("No exchange deployment on {0}")]
    ExchangeUnavailable(Network),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Price API error: {0}")]
    PriceApi(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SwapError {
    /// True for failures detected locally, before any request leaves the process
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::UnsupportedDirection { .. }
                | Self::InvalidAmount(_)
                | Self::InsufficientBalance { .. }
                | Self::ExchangeUnavailable(_)
                | Self::InvalidAddress(_)
        )
    }
}

/// Failures reported by the wallet while signing or executing a transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("rejected by user")]
    UserRejected,

    #[error("insufficient gas: {0}")]
    InsufficientGas(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("wallet returned no transaction digest")]
    MissingDigest,

    #[error("wallet transport failed: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
