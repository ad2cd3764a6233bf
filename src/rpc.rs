//! Sui fullnode JSON-RPC client (balance reads)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::account::SuiAddress;
use crate::error::SwapError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Balance of one coin type for one owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub coin_type: String,
    #[serde(default)]
    pub coin_object_count: u64,
    /// Base units; the node encodes this as a decimal string
    #[serde(with = "u64_string")]
    pub total_balance: u64,
}

/// Read-only balance access. Shared across all readers without locking.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn get_balance(&self, owner: &SuiAddress, coin_type: &str)
        -> Result<Balance, SwapError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

pub struct SuiRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self, SwapError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Every call is bounded by `timeout`; an unresponsive node surfaces as
    /// `SwapError::Rpc` instead of hanging the caller
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, SwapError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, SwapError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        log::debug!("RPC {} -> {} (id {})", method, self.url, id);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SwapError::Rpc(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SwapError::Rpc(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| SwapError::Rpc(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(SwapError::Rpc(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }

        parsed
            .result
            .ok_or_else(|| SwapError::Rpc(format!("{} returned no result", method)))
    }
}

#[async_trait]
impl BalanceReader for SuiRpcClient {
    async fn get_balance(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<Balance, SwapError> {
        self.call("suix_getBalance", json!([owner.as_str(), coin_type]))
            .await
    }
}

mod u64_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Str(s) if s.is_empty() => Ok(0),
            Raw::Str(s) => s.parse().map_err(de::Error::custom),
            Raw::Num(n) => Ok(n),
        }
    }
}
