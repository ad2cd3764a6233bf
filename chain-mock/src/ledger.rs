//! In-memory ledger backing the mock endpoints
//!
//! Holds balances per (owner, coin type) and prices per token. Request
//! counters let tests assert how many round trips a client made.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockPrice {
    pub price_native: Option<String>,
    pub price_usd: Option<String>,
}

#[derive(Default)]
pub struct MockLedger {
    balances: RwLock<HashMap<(String, String), u64>>,
    prices: RwLock<HashMap<String, MockPrice>>,
    delay: RwLock<Duration>,
    rpc_requests: AtomicU64,
    price_requests: AtomicU64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, owner: &str, coin_type: &str, amount: u64) {
        let mut balances = self.balances.write().unwrap_or_else(|p| p.into_inner());
        balances.insert((owner.to_lowercase(), coin_type.to_string()), amount);
    }

    /// `None` when the owner never held this coin type. SUI always has a
    /// balance (zero by default), like a real fullnode.
    pub fn balance(&self, owner: &str, coin_type: &str) -> Option<u64> {
        let balances = self.balances.read().unwrap_or_else(|p| p.into_inner());
        match balances.get(&(owner.to_lowercase(), coin_type.to_string())) {
            Some(amount) => Some(*amount),
            None if coin_type == SUI_COIN_TYPE => Some(0),
            None => None,
        }
    }

    pub fn set_price(&self, token: &str, price: MockPrice) {
        let mut prices = self.prices.write().unwrap_or_else(|p| p.into_inner());
        prices.insert(token.to_string(), price);
    }

    pub fn clear_price(&self, token: &str) {
        let mut prices = self.prices.write().unwrap_or_else(|p| p.into_inner());
        prices.remove(token);
    }

    pub fn price(&self, token: &str) -> Option<MockPrice> {
        let prices = self.prices.read().unwrap_or_else(|p| p.into_inner());
        prices.get(token).cloned()
    }

    /// Artificial latency added to every mocked response
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().unwrap_or_else(|p| p.into_inner()) = delay;
    }

    pub fn delay(&self) -> Duration {
        *self.delay.read().unwrap_or_else(|p| p.into_inner())
    }

    pub fn record_rpc_request(&self) {
        self.rpc_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_price_request(&self) {
        self.price_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn rpc_requests(&self) -> u64 {
        self.rpc_requests.load(Ordering::SeqCst)
    }

    pub fn price_requests(&self) -> u64 {
        self.price_requests.load(Ordering::SeqCst)
    }
}
