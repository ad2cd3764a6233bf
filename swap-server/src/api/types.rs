use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use suiwal_swap::{ExecuteOptions, Network, Preferences, Theme, Token, TransactionData};

#[derive(Debug, Deserialize, Default)]
pub struct UpdateSettingsRequest {
    pub theme: Option<Theme>,
    pub network: Option<Network>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub theme: Theme,
    pub network: Network,
}

impl From<Preferences> for SettingsResponse {
    fn from(prefs: Preferences) -> Self {
        Self {
            theme: prefs.theme,
            network: prefs.network,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateResponse {
    pub network: Network,
    /// WAL per SUI; "0" when unknown
    pub rate: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PricesResponse {
    pub sui_usd: Decimal,
    pub wal_usd: Decimal,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub network: Network,
    pub sui_mist: u64,
    pub sui: Decimal,
    pub wal_base_units: u64,
    pub wal: Decimal,
    /// False when the WAL read failed and the figures above read as zero
    pub wal_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Decimal string as typed by the user
    pub send_amount: String,
    #[serde(default = "default_send_token")]
    pub send_token: Token,
}

fn default_send_token() -> Token {
    Token::Sui
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub network: Network,
    pub send_token: Token,
    pub receive_token: Token,
    pub send_amount: Option<Decimal>,
    /// Four-decimal receive amount; absent when the rate is unknown
    pub receive_amount: Option<String>,
    pub rate: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PrepareSwapRequest {
    pub sender: String,
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSwapResponse {
    /// Serialized transaction data (version 2), ready for `Transaction.from`
    pub transaction: String,
    /// The same transaction in readable form
    pub plan: TransactionData,
    pub chain: String,
    pub options: ExecuteOptions,
    pub amount_mist: u64,
    pub expected_receive: Option<String>,
}
