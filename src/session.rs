//! Swap session: the state a swap screen works against
//!
//! Holds the swap intent, the latest balances, prices and rate, and the
//! transient status indicator. Owns the pollers feeding that state and tears
//! them down together.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::SwapError;
use crate::exchange::ExchangeHook;
use crate::intent::SwapIntent;
use crate::network::Network;
use crate::polling::{
    spawn_balance_poller, spawn_price_poller, BalanceSnapshot, PollHandle, RateRefresher,
    Relevance,
};
use crate::price::{PriceQuote, PriceService};
use crate::signer::ExecutionResult;
use crate::units;

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SwapStatus {
    #[default]
    Idle,
    Pending,
    Success {
        digest: String,
        sent: Decimal,
        expected: Option<Decimal>,
    },
    Failed {
        reason: String,
    },
}

impl SwapStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapStatus::Success { .. } | SwapStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    pub balance_interval: Duration,
    pub price_interval: Duration,
    pub status_clear_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            balance_interval: Duration::from_secs(10),
            price_interval: Duration::from_secs(60),
            status_clear_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub network: Network,
    pub intent: SwapIntent,
    /// WAL per SUI; zero while unknown
    pub rate: Decimal,
    pub prices: Option<PriceQuote>,
    pub balances: Option<BalanceSnapshot>,
    pub status: SwapStatus,
    /// Poller and timer updates applied while the session was live
    pub updates_applied: u64,
    /// Updates that reached the state after teardown. Stays zero.
    pub updates_after_teardown: u64,
}

impl SessionState {
    fn set_rate(&mut self, rate: Decimal) {
        self.rate = rate;
        self.intent.apply_rate(rate);
    }
}

/// Updates coming from background tasks go through here
#[derive(Clone)]
struct StateSink {
    state: Arc<Mutex<SessionState>>,
    torn_down: Arc<AtomicBool>,
}

impl StateSink {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update<F: FnOnce(&mut SessionState)>(&self, f: F) {
        let mut state = self.lock();
        if self.torn_down.load(Ordering::SeqCst) {
            state.updates_after_teardown += 1;
            log::warn!("State update arrived after teardown");
            return;
        }
        f(&mut state);
        state.updates_applied += 1;
    }
}

pub struct SwapSession {
    hooks: HashMap<Network, Arc<ExchangeHook>>,
    active: Mutex<Arc<ExchangeHook>>,
    prices: Arc<PriceService>,
    sink: StateSink,
    timings: SessionTimings,
    rates: RateRefresher,
    balance_poller: Mutex<Option<PollHandle>>,
    price_poller: Mutex<Option<PollHandle>>,
    status_guard: Relevance,
}

impl SwapSession {
    /// Session pinned to the hook's network
    pub fn new(hook: Arc<ExchangeHook>, prices: Arc<PriceService>, timings: SessionTimings) -> Self {
        let hooks = HashMap::from([(hook.network(), hook.clone())]);
        Self::build(hooks, hook, prices, timings)
    }

    /// Session able to switch between the networks of `hooks`, starting on `network`
    pub fn with_hooks(
        hooks: Vec<Arc<ExchangeHook>>,
        network: Network,
        prices: Arc<PriceService>,
        timings: SessionTimings,
    ) -> Result<Self, SwapError> {
        let hooks: HashMap<_, _> = hooks.into_iter().map(|h| (h.network(), h)).collect();
        let active = hooks
            .get(&network)
            .cloned()
            .ok_or_else(|| SwapError::Config(format!("No exchange hook for {}", network)))?;
        Ok(Self::build(hooks, active, prices, timings))
    }

    fn build(
        hooks: HashMap<Network, Arc<ExchangeHook>>,
        active: Arc<ExchangeHook>,
        prices: Arc<PriceService>,
        timings: SessionTimings,
    ) -> Self {
        let state = SessionState {
            network: active.network(),
            ..Default::default()
        };
        Self {
            rates: RateRefresher::new(prices.clone()),
            hooks,
            active: Mutex::new(active),
            prices,
            sink: StateSink {
                state: Arc::new(Mutex::new(state)),
                torn_down: Arc::new(AtomicBool::new(false)),
            },
            timings,
            balance_poller: Mutex::new(None),
            price_poller: Mutex::new(None),
            status_guard: Relevance::new(),
        }
    }

    fn hook(&self) -> Arc<ExchangeHook> {
        self.active.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn network(&self) -> Network {
        self.hook().network()
    }

    pub fn state(&self) -> SessionState {
        self.sink.lock().clone()
    }

    pub fn status(&self) -> SwapStatus {
        self.sink.lock().status.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.sink.torn_down.load(Ordering::SeqCst)
    }

    fn balance_poller_for(&self, hook: Arc<ExchangeHook>) -> PollHandle {
        let sink = self.sink.clone();
        spawn_balance_poller(hook, self.timings.balance_interval, move |snapshot| {
            sink.update(|s| s.balances = Some(snapshot))
        })
    }

    /// Start balance and price polling and fetch the rate for the selected network
    pub fn start(&self) {
        let mut price_poller = self.price_poller.lock().unwrap_or_else(|p| p.into_inner());
        if price_poller.is_some() || self.is_torn_down() {
            return;
        }

        let sink = self.sink.clone();
        *price_poller = Some(spawn_price_poller(
            self.prices.clone(),
            self.timings.price_interval,
            move |quote| sink.update(|s| s.prices = Some(quote)),
        ));
        drop(price_poller);

        let hook = self.hook();
        let network = hook.network();
        *self.balance_poller.lock().unwrap_or_else(|p| p.into_inner()) =
            Some(self.balance_poller_for(hook));

        self.refresh_rate();
        log::info!("Swap session started on {}", network);
    }

    /// Refetch the rate; an older refresh still in flight is discarded
    pub fn refresh_rate(&self) -> tokio::task::JoinHandle<bool> {
        let sink = self.sink.clone();
        self.rates.refresh(self.network(), move |network, rate| {
            log::debug!("Rate on {}: {} WAL per SUI", network, rate);
            sink.update(|s| s.set_rate(rate));
        })
    }

    /// Select another network.
    ///
    /// The rate and balances of the old network are cleared at once and reads
    /// still in flight for it are dropped. The rate is refetched for the new
    /// network, and a running balance poller restarts against its hook.
    /// Returns false when `network` is already selected.
    pub fn set_network(&self, network: Network) -> Result<bool, SwapError> {
        if self.is_torn_down() {
            return Ok(false);
        }
        let hook = self
            .hooks
            .get(&network)
            .cloned()
            .ok_or_else(|| SwapError::Config(format!("No exchange hook for {}", network)))?;

        {
            let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
            if active.network() == network {
                return Ok(false);
            }
            *active = hook.clone();
        }

        self.rates.cancel();
        self.sink.update(|s| {
            s.network = network;
            s.set_rate(Decimal::ZERO);
            s.balances = None;
        });

        {
            let mut balance_poller = self.balance_poller.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(mut old) = balance_poller.take() {
                old.stop();
                *balance_poller = Some(self.balance_poller_for(hook));
            }
        }

        self.refresh_rate();

        log::info!("Swap session switched to {}", network);
        Ok(true)
    }

    /// Stop every poller and timer. Results still in flight are dropped.
    pub fn teardown(&self) {
        for poller in [&self.balance_poller, &self.price_poller] {
            let handle = poller.lock().unwrap_or_else(|p| p.into_inner()).take();
            if let Some(mut handle) = handle {
                handle.stop();
            }
        }
        self.rates.close();
        self.status_guard.close();
        self.sink.torn_down.store(true, Ordering::SeqCst);
        log::info!("Swap session torn down");
    }

    /// Keystroke in the send field
    pub fn set_send_amount(&self, input: &str) -> Result<(), SwapError> {
        let amount = units::parse_amount(input)?;
        let mut state = self.sink.lock();
        let rate = state.rate;
        state.intent.set_send_amount(amount, rate);
        Ok(())
    }

    /// Token-cycle action
    pub fn flip_tokens(&self) {
        self.sink.lock().intent.flip();
    }

    pub fn dismiss_status(&self) {
        let ticket = self.status_guard.invalidate();
        self.status_guard
            .apply_if_current(ticket, || self.sink.update(|s| s.status = SwapStatus::Idle));
    }

    /// Validate locally, then submit through the exchange hook.
    ///
    /// Checks run in order (direction, amount, connection, balance) and none
    /// of them touch the network.
    pub async fn submit(&self) -> Result<ExecutionResult, SwapError> {
        let (intent, known_balance) = {
            let state = self.sink.lock();
            (state.intent.clone(), state.balances.clone())
        };

        let amount = match self.precheck(&intent, known_balance.as_ref()) {
            Ok(amount) => amount,
            Err(e) => {
                log::info!("Swap rejected locally: {}", e);
                self.finish(SwapStatus::Failed {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        let ticket = self.status_guard.invalidate();
        self.status_guard
            .apply_if_current(ticket, || self.sink.update(|s| s.status = SwapStatus::Pending));

        match self.hook().convert_sui_to_wal(amount).await {
            Ok(result) => {
                self.finish(SwapStatus::Success {
                    digest: result.digest.clone(),
                    sent: units::from_base_units(amount),
                    expected: intent.receive_amount,
                });
                Ok(result)
            }
            Err(e) => {
                self.finish(SwapStatus::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Re-run the whole submission path from the start
    pub async fn retry(&self) -> Result<ExecutionResult, SwapError> {
        log::info!("Retrying swap");
        self.submit().await
    }

    fn precheck(
        &self,
        intent: &SwapIntent,
        known_balance: Option<&BalanceSnapshot>,
    ) -> Result<u64, SwapError> {
        intent.validate(None)?;

        let address = self
            .hook()
            .connection()
            .address()
            .ok_or(SwapError::NotConnected)?;

        // Only trust a balance read for the account that is connected now
        let available = known_balance
            .filter(|b| b.address == address)
            .map(|b| b.sui);
        intent.validate(available)
    }

    /// Show a terminal status and schedule it to clear. A result arriving
    /// after teardown is dropped.
    fn finish(&self, status: SwapStatus) {
        let ticket = self.status_guard.invalidate();
        let shown = self
            .status_guard
            .apply_if_current(ticket, || self.sink.update(|s| s.status = status));
        if !shown {
            log::debug!("Discarding swap status, session is torn down");
            return;
        }

        let guard = self.status_guard.clone();
        let sink = self.sink.clone();
        let delay = self.timings.status_clear_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            guard.apply_if_current(ticket, || sink.update(|s| s.status = SwapStatus::Idle));
        });
    }
}

impl Drop for SwapSession {
    fn drop(&mut self) {
        if !self.is_torn_down() {
            self.teardown();
        }
    }
}
