use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use std::sync::Arc;

use suiwal_swap::{
    build_exchange_transaction, derive_receive_amount, units, ExchangeHook, ExecuteOptions,
    Network, SuiAddress, SwapError, SwapIntent, WalBalance,
};

use super::types::*;
use crate::{error::ApiError, state::AppState};

fn hook_for(state: &AppState, network: Network) -> Result<Arc<ExchangeHook>, ApiError> {
    state
        .hook(network)
        .cloned()
        .ok_or_else(|| SwapError::Config(format!("no RPC client for {}", network)).into())
}

fn display(amount: Decimal) -> String {
    format!("{:.4}", amount)
}

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(state.settings().preferences().into())
}

pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let mut settings = state.settings();
    if let Some(theme) = req.theme {
        settings.set_theme(theme)?;
    }
    if let Some(network) = req.network {
        settings.set_network(network)?;
    }
    Ok(Json(settings.preferences().into()))
}

pub async fn get_rate_handler(State(state): State<Arc<AppState>>) -> Json<RateResponse> {
    let network = state.network();
    let rate = state.prices().rate_for_network(network).await;
    Json(RateResponse { network, rate })
}

/// Latest polled quote; falls back to a direct fetch before the first poll lands
pub async fn get_prices_handler(State(state): State<Arc<AppState>>) -> Json<PricesResponse> {
    let quote = match state.latest_quote() {
        Some(quote) => quote,
        None => state.prices().quote().await,
    };

    Json(PricesResponse {
        sui_usd: quote.sui_usd,
        wal_usd: quote.wal_usd,
        fetched_at: quote.fetched_at,
    })
}

pub async fn get_balance_handler(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let address: SuiAddress = address.parse()?;
    let network = state.network();
    let hook = hook_for(&state, network)?;

    let sui_mist = hook.get_sui_balance(Some(&address)).await?;
    let wal = hook.read_wal_balance(Some(&address)).await?;
    let wal_available = matches!(wal, WalBalance::Available { .. });
    let wal_base_units = wal.amount_or_zero();

    Ok(Json(BalanceResponse {
        address: address.to_string(),
        network,
        sui_mist,
        sui: units::from_base_units(sui_mist),
        wal_base_units,
        wal: units::from_base_units(wal_base_units),
        wal_available,
    }))
}

pub async fn quote_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let amount = units::parse_amount(&req.send_amount)?;
    let network = state.network();

    let mut intent = SwapIntent::default();
    if intent.send_token != req.send_token {
        intent.flip();
    }

    let rate = if intent.is_supported_direction() {
        state.prices().rate_for_network(network).await
    } else {
        Decimal::ZERO
    };
    intent.set_send_amount(amount, rate);

    Ok(Json(QuoteResponse {
        network,
        send_token: intent.send_token,
        receive_token: intent.receive_token,
        send_amount: intent.send_amount,
        receive_amount: intent.receive_amount.map(display),
        rate,
    }))
}

/// Validate a swap and return the unsigned exchange transaction for the
/// browser wallet to sign
pub async fn prepare_swap_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrepareSwapRequest>,
) -> Result<Json<PrepareSwapResponse>, ApiError> {
    let sender: SuiAddress = req.sender.parse()?;
    let intent = SwapIntent::new(units::parse_amount(&req.amount)?);

    // Amount problems are reported before any RPC round trip
    intent.validate(None)?;

    let network = state.network();
    let deployment = network.exchange()?;
    let hook = hook_for(&state, network)?;

    let available = hook.get_sui_balance(Some(&sender)).await?;
    let amount_mist = intent.validate(Some(available))?;
    let plan = build_exchange_transaction(&sender, amount_mist, &deployment)?;
    let transaction = plan.to_wallet_string()?;

    let rate = state.prices().rate_for_network(network).await;
    let expected_receive = intent
        .send_amount
        .and_then(|send| derive_receive_amount(send, rate))
        .map(display);

    log::info!(
        "Prepared exchange of {} MIST for {} on {}",
        amount_mist,
        sender,
        network
    );

    Ok(Json(PrepareSwapResponse {
        transaction,
        plan,
        chain: network.chain_id(),
        options: ExecuteOptions::default(),
        amount_mist,
        expected_receive,
    }))
}
