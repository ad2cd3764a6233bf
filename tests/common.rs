//! Common test utilities for swap integration tests
//!
//! This module provides shared test infrastructure including:
//! - In-process fakes for the wallet signer, balance reads and price data
//! - Gates that hold a fetch in flight until the test releases it
//! - A chain mock bound to an ephemeral port

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

use chain_mock::MockLedger;
use suiwal_swap::{
    Balance, BalanceReader, DexScreenerClient, ExecuteRequest, ExecutionResult, PriceSource,
    Signer, SignerError, SuiAddress, SuiRpcClient, SwapError, TokenPair, SUI_COIN_TYPE,
};

pub const ALICE: &str = "0x00000000000000000000000000000000000000000000000000000000000a11ce";
pub const BOB: &str = "0x0000000000000000000000000000000000000000000000000000000000000b0b";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn address(raw: &str) -> SuiAddress {
    raw.parse().expect("valid test address")
}

/// Wait (real time) until `check` holds
pub async fn wait_until<F: Fn() -> bool>(check: F, what: &str) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}

// ============================================================================
// GATE
// ============================================================================

/// Holds fetches until released; records when one has started
pub struct Gate {
    entered: Notify,
    release: Semaphore,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    async fn pass(&self) {
        self.entered.notify_one();
        let permit = self.release.acquire().await.expect("gate closed");
        permit.forget();
    }

    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn open(&self) {
        self.release.add_permits(1_000);
    }
}

// ============================================================================
// SIGNER
// ============================================================================

/// Records every request; replies from a queue, then with a fixed digest
#[derive(Default)]
pub struct RecordingSigner {
    requests: Mutex<Vec<ExecuteRequest>>,
    replies: Mutex<VecDeque<Result<ExecutionResult, SignerError>>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl RecordingSigner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_with(&self, reply: Result<ExecutionResult, SignerError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<ExecuteRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Hold every submission until the gate opens
    pub fn gate(&self, gate: Arc<Gate>) {
        *self.gate.lock().unwrap() = Some(gate);
    }
}

pub fn executed(digest: &str) -> ExecutionResult {
    ExecutionResult {
        digest: digest.to_string(),
        effects: Some(serde_json::json!({"status": {"status": "success"}})),
        object_changes: Some(Vec::new()),
    }
}

#[async_trait]
impl Signer for RecordingSigner {
    async fn sign_and_execute(
        &self,
        request: ExecuteRequest,
    ) -> Result<ExecutionResult, SignerError> {
        self.requests.lock().unwrap().push(request);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(executed("8nG3xSuiDigest")))
    }
}

// ============================================================================
// BALANCES
// ============================================================================

/// In-memory balances. WAL reads fail unless a WAL balance was set, like a
/// fullnode asked about a coin the owner never held.
#[derive(Default)]
pub struct FakeBalances {
    balances: Mutex<HashMap<(String, String), u64>>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeBalances {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, owner: &str, coin_type: &str, amount: u64) {
        self.balances
            .lock()
            .unwrap()
            .insert((address(owner).to_string(), coin_type.to_string()), amount);
    }

    pub fn set_sui(&self, owner: &str, mist: u64) {
        self.set(owner, SUI_COIN_TYPE, mist);
    }

    pub fn gate(&self, gate: Arc<Gate>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceReader for FakeBalances {
    async fn get_balance(&self, owner: &SuiAddress, coin_type: &str) -> Result<Balance, SwapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        let amount = self
            .balances
            .lock()
            .unwrap()
            .get(&(owner.to_string(), coin_type.to_string()))
            .copied();

        match amount {
            Some(total_balance) => Ok(Balance {
                coin_type: coin_type.to_string(),
                coin_object_count: 1,
                total_balance,
            }),
            None if coin_type == SUI_COIN_TYPE => Ok(Balance {
                coin_type: coin_type.to_string(),
                coin_object_count: 0,
                total_balance: 0,
            }),
            None => Err(SwapError::Rpc(format!("no {} for {}", coin_type, owner))),
        }
    }
}

// ============================================================================
// PRICES
// ============================================================================

#[derive(Default)]
pub struct FakePrices {
    pairs: Mutex<HashMap<String, TokenPair>>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl FakePrices {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, token: &str, native: Option<&str>, usd: Option<&str>) {
        self.pairs.lock().unwrap().insert(
            token.to_string(),
            TokenPair {
                pair_address: None,
                price_native: native.map(str::to_string),
                price_usd: usd.map(str::to_string),
            },
        );
    }

    pub fn gate(&self, gate: Arc<Gate>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn first_pair(&self, token: &str) -> Result<Option<TokenPair>, SwapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(self.pairs.lock().unwrap().get(token).cloned())
    }
}

// ============================================================================
// CHAIN MOCK
// ============================================================================

/// Chain mock served on an ephemeral port; stopped on drop
pub struct MockChain {
    pub ledger: Arc<MockLedger>,
    pub url: String,
    server: JoinHandle<()>,
}

impl MockChain {
    pub async fn start() -> anyhow::Result<Self> {
        init_logging();
        let ledger = Arc::new(MockLedger::new());
        let (addr, server) = chain_mock::spawn(ledger.clone()).await?;
        log::info!("🔧 Chain mock on {}", addr);
        Ok(Self {
            ledger,
            url: format!("http://{}", addr),
            server,
        })
    }

    pub fn rpc(&self) -> Arc<SuiRpcClient> {
        Arc::new(SuiRpcClient::new(self.url.clone()).unwrap())
    }

    pub fn prices(&self) -> Arc<DexScreenerClient> {
        Arc::new(DexScreenerClient::new(self.url.clone()).unwrap())
    }

    pub fn rpc_with_timeout(&self, timeout: Duration) -> Arc<SuiRpcClient> {
        Arc::new(SuiRpcClient::with_timeout(self.url.clone(), timeout).unwrap())
    }

    pub fn prices_with_timeout(&self, timeout: Duration) -> Arc<DexScreenerClient> {
        Arc::new(DexScreenerClient::with_timeout(self.url.clone(), timeout).unwrap())
    }
}

impl Drop for MockChain {
    fn drop(&mut self) {
        self.server.abort();
    }
}
