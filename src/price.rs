//! Rate and USD price lookups against the DexScreener token API
//!
//! Nothing here caches or retries. Every call is a fresh round trip, and any
//! failure to obtain a usable price degrades to zero. Callers treat zero as
//! "unknown".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SwapError;
use crate::network::{Network, SUI_COIN_TYPE};

pub const DEXSCREENER_URL: &str = "https://api.dexscreener.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One trading pair from `GET /latest/dex/tokens/{token}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(default)]
    pub pair_address: Option<String>,
    /// Price of the token denominated in the pair's quote token
    #[serde(default)]
    pub price_native: Option<String>,
    #[serde(default)]
    pub price_usd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    #[serde(default)]
    pairs: Option<Vec<TokenPair>>,
}

/// Source of pair data. The first pair returned is authoritative.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn first_pair(&self, token: &str) -> Result<Option<TokenPair>, SwapError>;
}

pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SwapError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// A request that has not completed within `timeout` fails with
    /// `SwapError::PriceApi`, which the service reads as a zero price
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SwapError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapError::PriceApi(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for DexScreenerClient {
    async fn first_pair(&self, token: &str) -> Result<Option<TokenPair>, SwapError> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, token);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SwapError::PriceApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SwapError::PriceApi(format!(
                "GET {} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let body: TokensResponse = response
            .json()
            .await
            .map_err(|e| SwapError::PriceApi(e.to_string()))?;

        Ok(body.pairs.and_then(|pairs| pairs.into_iter().next()))
    }
}

/// USD valuation of both tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub sui_usd: Decimal,
    pub wal_usd: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// Parse a price string; anything unusable or negative is zero
fn parse_price(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| Decimal::from_str(s.trim()).ok())
        .filter(|p| !p.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

pub struct PriceService {
    source: Arc<dyn PriceSource>,
}

impl PriceService {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    async fn pair_or_none(&self, token: &str) -> Option<TokenPair> {
        match self.source.first_pair(token).await {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("Price lookup for {} failed: {}", token, e);
                None
            }
        }
    }

    /// Price of `token` in its pair's native quote token, or zero
    pub async fn native_price(&self, token: &str) -> Decimal {
        let pair = self.pair_or_none(token).await;
        parse_price(pair.as_ref().and_then(|p| p.price_native.as_deref()))
    }

    /// USD price of `token`, or zero
    pub async fn usd_price(&self, token: &str) -> Decimal {
        let pair = self.pair_or_none(token).await;
        parse_price(pair.as_ref().and_then(|p| p.price_usd.as_deref()))
    }

    /// WAL obtainable for 1 SUI on `network`; zero when unavailable.
    ///
    /// Networks with a fixed-parity exchange return exactly one. Elsewhere the
    /// rate is the reciprocal of WAL's price in SUI, taken from the mainnet
    /// WAL market since that is the only one with liquidity.
    pub async fn rate_for_network(&self, network: Network) -> Decimal {
        if network.constants().fixed_parity {
            return Decimal::ONE;
        }

        let wal_in_sui = self.native_price(Network::Mainnet.wal_coin_type()).await;
        if wal_in_sui <= Decimal::ZERO {
            log::debug!("No WAL/SUI price available, rate unknown");
            return Decimal::ZERO;
        }

        Decimal::ONE.checked_div(wal_in_sui).unwrap_or(Decimal::ZERO)
    }

    pub async fn sui_usd(&self) -> Decimal {
        self.usd_price(SUI_COIN_TYPE).await
    }

    /// WAL is only traded on mainnet; its USD price is network independent
    pub async fn wal_usd(&self) -> Decimal {
        self.usd_price(Network::Mainnet.wal_coin_type()).await
    }

    pub async fn quote(&self) -> PriceQuote {
        let (sui_usd, wal_usd) = tokio::join!(self.sui_usd(), self.wal_usd());
        PriceQuote {
            sui_usd,
            wal_usd,
            fetched_at: Utc::now(),
        }
    }
}
