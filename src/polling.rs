//! Cancellable periodic refresh
//!
//! Every fetch captures a [`Ticket`] from a [`Relevance`] guard before it
//! starts. Its result is applied only if the guard's generation is unchanged
//! when the result arrives. Stopping a poller closes the guard under the
//! same lock that applies results, so once `stop()` returns no callback from
//! that poller will run, including fetches that were already in flight.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::account::{Account, SuiAddress};
use crate::exchange::{ExchangeHook, WalBalance};
use crate::network::Network;
use crate::price::{PriceQuote, PriceService};

/// Generation captured when a fetch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct Generation {
    current: u64,
    closed: bool,
}

/// Shared generation counter deciding whether a result is still wanted.
///
/// Once closed, no ticket is current again, including tickets taken after
/// the close by a task that has not yet observed its abort.
#[derive(Clone, Default)]
pub struct Relevance {
    generation: Arc<Mutex<Generation>>,
}

impl Relevance {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Generation> {
        self.generation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.lock().current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        let generation = self.lock();
        !generation.closed && generation.current == ticket.0
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Supersede every outstanding ticket
    pub fn invalidate(&self) -> Ticket {
        let mut generation = self.lock();
        generation.current += 1;
        Ticket(generation.current)
    }

    /// Permanently refuse every ticket, past and future
    pub fn close(&self) {
        let mut generation = self.lock();
        generation.current += 1;
        generation.closed = true;
    }

    /// Run `apply` if `ticket` is still current. The lock is held while
    /// `apply` runs, so `apply` must not touch this guard.
    pub fn apply_if_current<F: FnOnce()>(&self, ticket: Ticket, apply: F) -> bool {
        let generation = self.lock();
        if generation.closed || generation.current != ticket.0 {
            return false;
        }
        apply();
        true
    }
}

/// Handle to a running poller. Dropping it stops the poller.
pub struct PollHandle {
    name: &'static str,
    relevance: Relevance,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    fn new(name: &'static str, relevance: Relevance, task: JoinHandle<()>) -> Self {
        Self {
            name,
            relevance,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Stop the timer and discard results of fetches still in flight.
    ///
    /// The guard is closed before the task is aborted: an abort lands only at
    /// the task's next yield, and nothing it starts in between may apply.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            self.relevance.close();
            task.abort();
            log::debug!("Poller '{}' stopped", self.name);
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Repeating fetch-and-apply task
pub struct PeriodicTask;

impl PeriodicTask {
    /// Run `fetch` immediately and then every `interval`; feed results to `apply`.
    pub fn start<T, F, Fut, A>(interval: Duration, fetch: F, apply: A) -> PollHandle
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        A: Fn(T) + Send + Sync + 'static,
    {
        Self::start_named("periodic", interval, fetch, apply)
    }

    /// Like [`PeriodicTask::start`], with a name for log lines.
    ///
    /// Each fetch runs on its own task, so a slow round trip overlaps with the
    /// next tick instead of delaying it.
    pub fn start_named<T, F, Fut, A>(
        name: &'static str,
        interval: Duration,
        fetch: F,
        apply: A,
    ) -> PollHandle
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        A: Fn(T) + Send + Sync + 'static,
    {
        let relevance = Relevance::new();
        let guard = relevance.clone();
        let apply = Arc::new(apply);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if guard.is_closed() {
                    return;
                }
                let ticket = guard.ticket();
                let pending = fetch();
                let guard = guard.clone();
                let apply = apply.clone();

                tokio::spawn(async move {
                    let value = pending.await;
                    if !guard.apply_if_current(ticket, || apply(value)) {
                        log::debug!("Discarding stale '{}' result", name);
                    }
                });
            }
        });

        log::debug!("Poller '{}' started every {:?}", name, interval);
        PollHandle::new(name, relevance, task)
    }
}

/// Balances of the connected account at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub address: SuiAddress,
    pub sui: u64,
    pub wal: WalBalance,
    pub fetched_at: DateTime<Utc>,
}

fn connected_address(rx: &mut tokio::sync::watch::Receiver<Option<Account>>) -> Option<SuiAddress> {
    rx.borrow_and_update().as_ref().map(|a| a.address.clone())
}

/// Poll SUI and WAL balances while an account is connected.
///
/// On disconnect the timer is dropped and in-flight reads are discarded; a
/// later connect starts a fresh timer for the new account.
pub fn spawn_balance_poller<A>(hook: Arc<ExchangeHook>, interval: Duration, apply: A) -> PollHandle
where
    A: Fn(BalanceSnapshot) + Send + Sync + 'static,
{
    let relevance = Relevance::new();
    let guard = relevance.clone();
    let apply = Arc::new(apply);
    let mut account_rx = hook.connection().subscribe();

    let task = tokio::spawn(async move {
        loop {
            let address = loop {
                if let Some(address) = connected_address(&mut account_rx) {
                    break address;
                }
                if account_rx.changed().await.is_err() {
                    return;
                }
            };

            log::debug!("Balance polling started for {}", address);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if guard.is_closed() {
                            return;
                        }
                        let ticket = guard.ticket();
                        let hook = hook.clone();
                        let guard = guard.clone();
                        let apply = apply.clone();
                        let address = address.clone();

                        tokio::spawn(async move {
                            let sui = match hook.get_sui_balance(Some(&address)).await {
                                Ok(sui) => sui,
                                Err(e) => {
                                    log::warn!("SUI balance refresh failed for {}: {}", address, e);
                                    return;
                                }
                            };
                            let wal = match hook.read_wal_balance(Some(&address)).await {
                                Ok(wal) => wal,
                                Err(e) => {
                                    log::warn!("WAL balance refresh failed for {}: {}", address, e);
                                    return;
                                }
                            };
                            let snapshot = BalanceSnapshot {
                                address,
                                sui,
                                wal,
                                fetched_at: Utc::now(),
                            };
                            if !guard.apply_if_current(ticket, || apply(snapshot)) {
                                log::debug!("Discarding stale balance result");
                            }
                        });
                    }
                    changed = account_rx.changed() => {
                        guard.invalidate();
                        if changed.is_err() {
                            return;
                        }
                        log::debug!("Account changed, balance polling for {} stopped", address);
                        break;
                    }
                }
            }
        }
    });

    PollHandle::new("balances", relevance, task)
}

/// Poll USD prices for both tokens regardless of wallet state
pub fn spawn_price_poller<A>(service: Arc<PriceService>, interval: Duration, apply: A) -> PollHandle
where
    A: Fn(PriceQuote) + Send + Sync + 'static,
{
    PeriodicTask::start_named(
        "prices",
        interval,
        move || {
            let service = service.clone();
            async move { service.quote().await }
        },
        apply,
    )
}

/// One-shot rate fetches keyed to the selected network. A newer refresh
/// supersedes any fetch still in flight for an older selection.
pub struct RateRefresher {
    service: Arc<PriceService>,
    relevance: Relevance,
}

impl RateRefresher {
    pub fn new(service: Arc<PriceService>) -> Self {
        Self {
            service,
            relevance: Relevance::new(),
        }
    }

    pub fn refresh<A>(&self, network: Network, apply: A) -> JoinHandle<bool>
    where
        A: FnOnce(Network, rust_decimal::Decimal) + Send + 'static,
    {
        let ticket = self.relevance.invalidate();
        let guard = self.relevance.clone();
        let service = self.service.clone();

        tokio::spawn(async move {
            let rate = service.rate_for_network(network).await;
            let applied = guard.apply_if_current(ticket, || apply(network, rate));
            if !applied {
                log::debug!("Discarding superseded {} rate", network);
            }
            applied
        })
    }

    /// Discard any in-flight refresh
    pub fn cancel(&self) {
        self.relevance.invalidate();
    }

    /// Discard in-flight refreshes and refuse every later one
    pub fn close(&self) {
        self.relevance.close();
    }
}
