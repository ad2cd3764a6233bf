//! Axum HTTP handlers for the mocked endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ledger::{MockLedger, MockPrice};
use crate::types::*;

/// Shared application state
pub type AppState = Arc<MockLedger>;

/// Custom error type for handlers
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, message).into_response()
    }
}

// JSON-RPC error codes used by the Sui fullnode
const INVALID_PARAMS: i64 = -32602;
const METHOD_NOT_FOUND: i64 = -32601;

async fn simulate_latency(ledger: &MockLedger) {
    let delay = ledger.delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// POST /
/// Sui JSON-RPC endpoint. Only `suix_getBalance` is implemented.
pub async fn json_rpc(
    State(ledger): State<AppState>,
    Json(req): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    ledger.record_rpc_request();
    simulate_latency(&ledger).await;

    let response = match req.method.as_str() {
        "suix_getBalance" => get_balance(&ledger, req.id, &req.params),
        other => JsonRpcResponse::error(
            req.id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        ),
    };

    Json(response)
}

fn get_balance(ledger: &MockLedger, id: Value, params: &[Value]) -> JsonRpcResponse {
    let owner = match params.first().and_then(Value::as_str) {
        Some(owner) => owner,
        None => return JsonRpcResponse::error(id, INVALID_PARAMS, "missing owner"),
    };
    let coin_type = params
        .get(1)
        .and_then(Value::as_str)
        .unwrap_or(crate::ledger::SUI_COIN_TYPE);

    match ledger.balance(owner, coin_type) {
        Some(amount) => {
            let result = BalanceResult {
                coin_type: coin_type.to_string(),
                coin_object_count: if amount > 0 { 1 } else { 0 },
                total_balance: amount.to_string(),
                locked_balance: serde_json::Map::new(),
            };
            JsonRpcResponse::result(id, json!(result))
        }
        None => JsonRpcResponse::error(
            id,
            INVALID_PARAMS,
            format!("Cannot find coin metadata for type {}", coin_type),
        ),
    }
}

/// GET /latest/dex/tokens/{token}
/// DexScreener-shaped pair listing. Unknown tokens yield `pairs: null`.
pub async fn token_pairs(
    State(ledger): State<AppState>,
    Path(token): Path<String>,
) -> Json<TokensResponse> {
    ledger.record_price_request();
    simulate_latency(&ledger).await;

    let pairs = ledger.price(&token).map(|price| {
        vec![PairResponse {
            chain_id: "sui".to_string(),
            dex_id: "mock".to_string(),
            pair_address: format!("{}-mock-pair", token),
            price_native: price.price_native,
            price_usd: price.price_usd,
        }]
    });

    Json(TokensResponse {
        schema_version: "1.0.0".to_string(),
        pairs,
    })
}

// ============================================================================
// MOCK CONTROL ENDPOINTS
// ============================================================================

/// POST /mock/balance
pub async fn set_balance(
    State(ledger): State<AppState>,
    Json(req): Json<SetBalanceRequest>,
) -> Result<StatusCode, ApiError> {
    if !req.owner.starts_with("0x") {
        return Err(ApiError::BadRequest(format!("invalid owner: {}", req.owner)));
    }
    log::info!("Setting {} balance of {} to {}", req.coin_type, req.owner, req.amount);
    ledger.set_balance(&req.owner, &req.coin_type, req.amount);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /mock/price
pub async fn set_price(
    State(ledger): State<AppState>,
    Json(req): Json<SetPriceRequest>,
) -> StatusCode {
    log::info!(
        "Setting price of {}: native={:?} usd={:?}",
        req.token,
        req.price_native,
        req.price_usd
    );
    ledger.set_price(
        &req.token,
        MockPrice {
            price_native: req.price_native,
            price_usd: req.price_usd,
        },
    );
    StatusCode::NO_CONTENT
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
