//! Connected wallet account
//!
//! [`WalletConnection`] is the current-account half of the wallet capability.
//! It is a watch channel so pollers can react the moment an account
//! disconnects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

use crate::error::SwapError;

/// 32-byte Sui address, stored in its canonical `0x`-prefixed lowercase form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SuiAddress(String);

impl SuiAddress {
    pub const LENGTH: usize = 32;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw address bytes, as BCS encodes an `address`
    pub fn to_bytes(&self) -> Result<[u8; Self::LENGTH], SwapError> {
        let mut bytes = [0u8; Self::LENGTH];
        let body = self.0.strip_prefix("0x").unwrap_or(&self.0);
        hex::decode_to_slice(body, &mut bytes)
            .map_err(|e| SwapError::InvalidAddress(format!("{}: {}", self.0, e)))?;
        Ok(bytes)
    }
}

impl FromStr for SuiAddress {
    type Err = SwapError;

    /// Accepts short forms (`0x2`) and left-pads them to 32 bytes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| SwapError::InvalidAddress(format!("missing 0x prefix: {}", s)))?;

        if body.is_empty() || body.len() > Self::LENGTH * 2 {
            return Err(SwapError::InvalidAddress(format!(
                "expected 1 to {} hex digits: {}",
                Self::LENGTH * 2,
                s
            )));
        }

        let padded = format!("{:0>width$}", body.to_lowercase(), width = Self::LENGTH * 2);
        hex::decode(&padded).map_err(|e| SwapError::InvalidAddress(format!("{}: {}", s, e)))?;

        Ok(SuiAddress(format!("0x{}", padded)))
    }
}

impl TryFrom<String> for SuiAddress {
    type Error = SwapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SuiAddress> for String {
    fn from(address: SuiAddress) -> Self {
        address.0
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: SuiAddress,
}

/// Current-account state shared between the exchange hook, pollers and
/// whatever owns the wallet adapter.
#[derive(Clone)]
pub struct WalletConnection {
    tx: watch::Sender<Option<Account>>,
}

impl WalletConnection {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn connect(&self, address: SuiAddress) {
        log::info!("Wallet connected: {}", address);
        self.tx.send_replace(Some(Account { address }));
    }

    pub fn disconnect(&self) {
        if self.tx.send_replace(None).is_some() {
            log::info!("Wallet disconnected");
        }
    }

    pub fn current(&self) -> Option<Account> {
        self.tx.borrow().clone()
    }

    pub fn address(&self) -> Option<SuiAddress> {
        self.tx.borrow().as_ref().map(|a| a.address.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Account>> {
        self.tx.subscribe()
    }
}

impl Default for WalletConnection {
    fn default() -> Self {
        Self::new()
    }
}
