//! HTTP API tests against an in-process chain mock
//!
//! Each test spins up its own mock ledger on an ephemeral port and drives the
//! router directly with `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chain_mock::{MockLedger, MockPrice, SUI_COIN_TYPE};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use suiwal_swap::{DexScreenerClient, MemoryPreferences, Network, SettingsStore, SwapConfig};
use swap_server::api::server::create_router;
use swap_server::api::types::*;
use swap_server::AppState;

const OWNER: &str = "0x00000000000000000000000000000000000000000000000000000000000a11ce";

struct TestServer {
    router: Router,
    ledger: Arc<MockLedger>,
    mock: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.mock.abort();
    }
}

async fn setup(network: Network) -> TestServer {
    let _ = env_logger::builder().is_test(true).try_init();

    let ledger = Arc::new(MockLedger::new());
    let (addr, mock) = chain_mock::spawn(ledger.clone()).await.unwrap();
    let base = format!("http://{}", addr);

    let config = SwapConfig {
        network,
        rpc_url: Some(base.clone()),
        price_api_url: base.clone(),
        ..Default::default()
    };
    let settings =
        SettingsStore::load(Box::new(MemoryPreferences::with(&[("network", network.as_str())])))
            .unwrap();
    let prices = Arc::new(DexScreenerClient::new(base).unwrap());
    let state = AppState::new(config, settings, prices).unwrap();

    TestServer {
        router: create_router(state),
        ledger,
        mock,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, value)
}

// ============================================================================
// SETTINGS
// ============================================================================

#[tokio::test]
async fn test_health_and_settings() {
    let server = setup(Network::Testnet).await;

    let (status, body) = send(&server.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));

    let (status, body) = send(&server.router, Method::GET, "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"theme": "light", "network": "testnet"}));

    let (status, body) = send(
        &server.router,
        Method::PUT,
        "/api/settings",
        Some(json!({"theme": "dark", "network": "mainnet"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"theme": "dark", "network": "mainnet"}));

    let (_, body) = send(&server.router, Method::GET, "/api/settings", None).await;
    assert_eq!(body["network"], "mainnet");
}

// ============================================================================
// RATES AND PRICES
// ============================================================================

#[tokio::test]
async fn test_rate_per_network() {
    let server = setup(Network::Testnet).await;
    let (status, body) = send(&server.router, Method::GET, "/api/rate", None).await;
    assert_eq!(status, StatusCode::OK);
    let rate: RateResponse = serde_json::from_value(body).unwrap();
    assert_eq!(rate.network, Network::Testnet);
    assert_eq!(rate.rate, Decimal::ONE);
    assert_eq!(server.ledger.price_requests(), 0);

    let server = setup(Network::Mainnet).await;
    let (_, body) = send(&server.router, Method::GET, "/api/rate", None).await;
    let rate: RateResponse = serde_json::from_value(body).unwrap();
    assert_eq!(rate.rate, Decimal::ZERO);

    server.ledger.set_price(
        Network::Mainnet.wal_coin_type(),
        MockPrice {
            price_native: Some("0.5".into()),
            price_usd: Some("1.70".into()),
        },
    );
    let (_, body) = send(&server.router, Method::GET, "/api/rate", None).await;
    let rate: RateResponse = serde_json::from_value(body).unwrap();
    assert_eq!(rate.rate, Decimal::from(2));
}

#[tokio::test]
async fn test_prices_fetched_on_demand() {
    let server = setup(Network::Testnet).await;
    server.ledger.set_price(
        SUI_COIN_TYPE,
        MockPrice {
            price_native: Some("1".into()),
            price_usd: Some("3.47".into()),
        },
    );

    let (status, body) = send(&server.router, Method::GET, "/api/prices", None).await;
    assert_eq!(status, StatusCode::OK);
    let prices: PricesResponse = serde_json::from_value(body).unwrap();
    assert_eq!(prices.sui_usd, Decimal::from_str("3.47").unwrap());
    // No WAL pair listed
    assert_eq!(prices.wal_usd, Decimal::ZERO);
}

// ============================================================================
// BALANCES
// ============================================================================

#[tokio::test]
async fn test_balance_without_wal_history() {
    let server = setup(Network::Testnet).await;
    server.ledger.set_balance(OWNER, SUI_COIN_TYPE, 10_000_000_000);

    let (status, body) = send(
        &server.router,
        Method::GET,
        "/api/balance/0xa11ce",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let balance: BalanceResponse = serde_json::from_value(body).unwrap();
    assert_eq!(balance.address, OWNER);
    assert_eq!(balance.sui_mist, 10_000_000_000);
    assert_eq!(balance.sui, Decimal::from(10));
    assert_eq!(balance.wal_base_units, 0);
    assert!(!balance.wal_available);
}

#[tokio::test]
async fn test_balance_rejects_bad_address() {
    let server = setup(Network::Testnet).await;
    let (status, body) = send(&server.router, Method::GET, "/api/balance/alice", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid address"));
    assert_eq!(server.ledger.rpc_requests(), 0);
}

// ============================================================================
// QUOTES AND SWAP PREPARATION
// ============================================================================

#[tokio::test]
async fn test_quote_derives_receive_amount() {
    let server = setup(Network::Testnet).await;

    let (status, body) = send(
        &server.router,
        Method::POST,
        "/api/quote",
        Some(json!({"send_amount": "5"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quote: QuoteResponse = serde_json::from_value(body).unwrap();
    assert_eq!(quote.receive_amount.as_deref(), Some("5.0000"));

    let (_, body) = send(
        &server.router,
        Method::POST,
        "/api/quote",
        Some(json!({"send_amount": ""})),
    )
    .await;
    let quote: QuoteResponse = serde_json::from_value(body).unwrap();
    assert!(quote.send_amount.is_none());
    assert!(quote.receive_amount.is_none());

    // Reverse direction is never derived
    let (_, body) = send(
        &server.router,
        Method::POST,
        "/api/quote",
        Some(json!({"send_amount": "5", "send_token": "WAL"})),
    )
    .await;
    let quote: QuoteResponse = serde_json::from_value(body).unwrap();
    assert!(quote.receive_amount.is_none());
    assert_eq!(quote.rate, Decimal::ZERO);

    let (status, _) = send(
        &server.router,
        Method::POST,
        "/api/quote",
        Some(json!({"send_amount": "five"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_prepare_swap_builds_exchange_transaction() {
    let server = setup(Network::Testnet).await;
    server.ledger.set_balance(OWNER, SUI_COIN_TYPE, 10_000_000_000);

    let (status, body) = send(
        &server.router,
        Method::POST,
        "/api/swap/prepare",
        Some(json!({"sender": OWNER, "amount": "5"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let prepared: PrepareSwapResponse = serde_json::from_value(body).unwrap();
    assert_eq!(prepared.chain, "sui:testnet");
    assert_eq!(prepared.amount_mist, 5_000_000_000);
    assert_eq!(prepared.plan.split_amounts(), vec![5_000_000_000]);
    assert_eq!(prepared.plan.sender.as_str(), OWNER);
    assert_eq!(prepared.expected_receive.as_deref(), Some("5.0000"));

    let call = prepared.plan.move_calls().next().unwrap();
    assert_eq!(call.function, "exchange_all_for_wal");

    // What the wallet receives: serialized data with BCS-encoded pure inputs
    let wallet: Value = serde_json::from_str(&prepared.transaction).unwrap();
    assert_eq!(wallet["version"], 2);
    assert_eq!(wallet["sender"], OWNER);
    assert_eq!(wallet["inputs"][0]["Pure"]["bytes"], "APIFKgEAAAA=");
    assert_eq!(wallet["commands"][0]["SplitCoins"]["coin"], json!({ "GasCoin": true }));
    assert_eq!(
        wallet["commands"][1]["MoveCall"]["function"],
        "exchange_all_for_wal"
    );
}

#[tokio::test]
async fn test_prepare_swap_insufficient_balance() {
    let server = setup(Network::Testnet).await;
    server.ledger.set_balance(OWNER, SUI_COIN_TYPE, 3_000_000_000);

    let (status, body) = send(
        &server.router,
        Method::POST,
        "/api/swap/prepare",
        Some(json!({"sender": OWNER, "amount": "5"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Insufficient balance"));
}

#[tokio::test]
async fn test_prepare_swap_rejects_locally_before_rpc() {
    let server = setup(Network::Testnet).await;

    for amount in ["0", "", "-1"] {
        let (status, _) = send(
            &server.router,
            Method::POST,
            "/api/swap/prepare",
            Some(json!({"sender": OWNER, "amount": amount})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {:?}", amount);
    }
    assert_eq!(server.ledger.rpc_requests(), 0);
}

#[tokio::test]
async fn test_prepare_swap_unavailable_on_mainnet() {
    let server = setup(Network::Mainnet).await;
    server.ledger.set_balance(OWNER, SUI_COIN_TYPE, 10_000_000_000);

    let (status, body) = send(
        &server.router,
        Method::POST,
        "/api/swap/prepare",
        Some(json!({"sender": OWNER, "amount": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("mainnet"));
    assert_eq!(server.ledger.rpc_requests(), 0);
}
