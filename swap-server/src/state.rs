//! Shared server state
//!
//! One read-only exchange hook per network, the preference store, and the
//! latest USD quote kept fresh by a background poller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use suiwal_swap::{
    spawn_price_poller, DexScreenerClient, ExchangeHook, FilePreferences, Network, PollHandle,
    PriceQuote, PriceService, PriceSource, SettingsStore, SuiRpcClient, SwapConfig, SwapError,
};

pub struct AppState {
    config: SwapConfig,
    settings: Mutex<SettingsStore>,
    prices: Arc<PriceService>,
    hooks: HashMap<Network, Arc<ExchangeHook>>,
    latest_quote: Arc<RwLock<Option<PriceQuote>>>,
    price_poller: Mutex<Option<PollHandle>>,
}

impl AppState {
    pub fn new(
        config: SwapConfig,
        settings: SettingsStore,
        price_source: Arc<dyn PriceSource>,
    ) -> Result<Arc<Self>, SwapError> {
        let hooks = [Network::Testnet, Network::Mainnet]
            .into_iter()
            .map(|network| {
                let rpc = Arc::new(SuiRpcClient::new(config.rpc_url_for(network))?);
                Ok((network, Arc::new(ExchangeHook::read_only(network, rpc))))
            })
            .collect::<Result<HashMap<_, _>, SwapError>>()?;

        Ok(Arc::new(Self {
            settings: Mutex::new(settings),
            prices: Arc::new(PriceService::new(price_source)),
            hooks,
            latest_quote: Arc::new(RwLock::new(None)),
            price_poller: Mutex::new(None),
            config,
        }))
    }

    /// Production wiring: file-backed preferences and the configured price API
    pub fn from_config(config: SwapConfig) -> anyhow::Result<Arc<Self>> {
        let settings =
            SettingsStore::load(Box::new(FilePreferences::new(&config.settings_path)))?;
        log::info!(
            "📁 Preferences: {} (network={})",
            config.settings_path.display(),
            settings.network()
        );

        let source = Arc::new(DexScreenerClient::new(config.price_api_url.clone())?);
        Ok(Self::new(config, settings, source)?)
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    pub fn settings(&self) -> MutexGuard<'_, SettingsStore> {
        self.settings.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Network currently selected in preferences
    pub fn network(&self) -> Network {
        self.settings().network()
    }

    pub fn prices(&self) -> &Arc<PriceService> {
        &self.prices
    }

    pub fn hook(&self, network: Network) -> Option<&Arc<ExchangeHook>> {
        self.hooks.get(&network)
    }

    pub fn latest_quote(&self) -> Option<PriceQuote> {
        *self.latest_quote.read().unwrap_or_else(|p| p.into_inner())
    }

    /// Start the background USD price poller (idempotent)
    pub fn start_price_polling(&self) {
        let mut poller = self.price_poller.lock().unwrap_or_else(|p| p.into_inner());
        if poller.is_some() {
            return;
        }

        let latest = self.latest_quote.clone();
        *poller = Some(spawn_price_poller(
            self.prices.clone(),
            self.config.price_poll_interval,
            move |quote| {
                log::debug!("Prices: SUI ${} / WAL ${}", quote.sui_usd, quote.wal_usd);
                *latest.write().unwrap_or_else(|p| p.into_inner()) = Some(quote);
            },
        ));
    }

    pub fn stop_price_polling(&self) {
        let mut poller = self.price_poller.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(mut handle) = poller.take() {
            handle.stop();
        }
    }
}
