//! Wire types for the mocked Sui JSON-RPC and DexScreener endpoints
//!
//! These match the upstream formats so clients consume them transparently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// `suix_getBalance` result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub coin_type: String,
    pub coin_object_count: u64,
    pub total_balance: String,
    pub locked_balance: serde_json::Map<String, Value>,
}

/// Response from /latest/dex/tokens/{token}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub schema_version: String,
    pub pairs: Option<Vec<PairResponse>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairResponse {
    pub chain_id: String,
    pub dex_id: String,
    pub pair_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_native: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<String>,
}

// ============================================================================
// Mock control requests (not part of any upstream API)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBalanceRequest {
    pub owner: String,
    pub coin_type: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPriceRequest {
    pub token: String,
    #[serde(default)]
    pub price_native: Option<String>,
    #[serde(default)]
    pub price_usd: Option<String>,
}
