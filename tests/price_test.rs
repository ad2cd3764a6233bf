//! Price service against the chain mock's DexScreener endpoint

mod common;

use chain_mock::MockPrice;
use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use suiwal_swap::{DexScreenerClient, Network, PriceService, SUI_COIN_TYPE};

fn price(native: Option<&str>, usd: Option<&str>) -> MockPrice {
    MockPrice {
        price_native: native.map(str::to_string),
        price_usd: usd.map(str::to_string),
    }
}

#[tokio::test]
async fn test_missing_pairs_read_as_zero() -> anyhow::Result<()> {
    let chain = MockChain::start().await?;
    let service = PriceService::new(chain.prices());

    assert_eq!(service.usd_price(SUI_COIN_TYPE).await, Decimal::ZERO);
    assert_eq!(service.rate_for_network(Network::Mainnet).await, Decimal::ZERO);
    assert_eq!(chain.ledger.price_requests(), 2);
    Ok(())
}

#[tokio::test]
async fn test_testnet_rate_needs_no_lookup() -> anyhow::Result<()> {
    let chain = MockChain::start().await?;
    let service = PriceService::new(chain.prices());

    assert_eq!(service.rate_for_network(Network::Testnet).await, Decimal::ONE);
    assert_eq!(chain.ledger.price_requests(), 0);
    Ok(())
}

#[tokio::test]
async fn test_mainnet_rate_is_reciprocal_of_native_price() -> anyhow::Result<()> {
    let chain = MockChain::start().await?;
    let wal = Network::Mainnet.wal_coin_type();
    let service = PriceService::new(chain.prices());

    chain.ledger.set_price(wal, price(Some("0.25"), Some("0.87")));
    assert_eq!(service.rate_for_network(Network::Mainnet).await, dec!(4));

    chain.ledger.set_price(wal, price(Some("0"), Some("0.87")));
    assert_eq!(service.rate_for_network(Network::Mainnet).await, Decimal::ZERO);

    chain.ledger.set_price(wal, price(Some("-0.5"), None));
    assert_eq!(service.rate_for_network(Network::Mainnet).await, Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn test_quote_values_both_tokens() -> anyhow::Result<()> {
    let chain = MockChain::start().await?;
    chain
        .ledger
        .set_price(SUI_COIN_TYPE, price(Some("1"), Some("3.47")));
    chain
        .ledger
        .set_price(Network::Mainnet.wal_coin_type(), price(Some("0.25"), Some("0.87")));

    let quote = PriceService::new(chain.prices()).quote().await;
    assert_eq!(quote.sui_usd, dec!(3.47));
    assert_eq!(quote.wal_usd, dec!(0.87));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_api_reads_as_zero() {
    init_logging();
    let service = PriceService::new(Arc::new(DexScreenerClient::new("http://127.0.0.1:1").unwrap()));
    assert_eq!(service.sui_usd().await, Decimal::ZERO);
    assert_eq!(service.rate_for_network(Network::Mainnet).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_slow_api_times_out_as_zero() -> anyhow::Result<()> {
    let chain = MockChain::start().await?;
    chain.ledger.set_price(SUI_COIN_TYPE, price(None, Some("3.47")));
    chain.ledger.set_delay(std::time::Duration::from_secs(2));

    let service =
        PriceService::new(chain.prices_with_timeout(std::time::Duration::from_millis(200)));
    let started = std::time::Instant::now();
    assert_eq!(service.sui_usd().await, Decimal::ZERO);
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
    Ok(())
}
