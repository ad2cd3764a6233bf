//! Sui network selection and per-network protocol constants
//!
//! Mainnet and testnet carry separate constant sets. They must never be mixed:
//! every lookup goes through [`Network::constants`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SwapError;

/// Native SUI coin type
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Move module and entry function of the SUI -> WAL exchange
pub const EXCHANGE_MODULE: &str = "wal_exchange";
pub const EXCHANGE_FUNCTION: &str = "exchange_all_for_wal";

/// On-chain exchange deployment used for conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeDeployment {
    pub package_id: &'static str,
    pub exchange_object_id: &'static str,
}

impl ExchangeDeployment {
    /// Fully-qualified Move call target (`<package>::wal_exchange::exchange_all_for_wal`)
    pub fn target(&self) -> String {
        format!(
            "{}::{}::{}",
            self.package_id, EXCHANGE_MODULE, EXCHANGE_FUNCTION
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConstants {
    /// WAL coin type (inner type, not the `Coin<T>` wrapper)
    pub wal_coin_type: &'static str,
    /// Exchange deployment, if one exists on this network
    pub exchange: Option<ExchangeDeployment>,
    /// The exchange on this network converts at a fixed 1:1 rate
    pub fixed_parity: bool,
}

const TESTNET: NetworkConstants = NetworkConstants {
    wal_coin_type:
        "0x8270feb7375eee355e64fdb69c50abb6b5f9393a722883c1cf45f8e26048810a::wal::WAL",
    exchange: Some(ExchangeDeployment {
        package_id: "0x82593828ed3fcb8c6a235eac9abd0adbe9c5f9bbffa9b1e7a45cdd884481ef9f",
        exchange_object_id: "0x19825121c52080bb1073662231cfea5c0e4d905fd13e95f21e9a018f2ef41862",
    }),
    fixed_parity: true,
};

// No published mainnet exchange yet. Rates come from the price API.
const MAINNET: NetworkConstants = NetworkConstants {
    wal_coin_type:
        "0x356a26eb9e012a68958082340d4c4116e7f55615cf27affcff209cf0ae544f59::wal::WAL",
    exchange: None,
    fixed_parity: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn constants(&self) -> &'static NetworkConstants {
        match self {
            Network::Mainnet => &MAINNET,
            Network::Testnet => &TESTNET,
        }
    }

    /// Public fullnode JSON-RPC endpoint
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
        }
    }

    /// Wallet-standard chain identifier (`sui:testnet`)
    pub fn chain_id(&self) -> String {
        format!("sui:{}", self.as_str())
    }

    pub fn wal_coin_type(&self) -> &'static str {
        self.constants().wal_coin_type
    }

    pub fn exchange(&self) -> Result<ExchangeDeployment, SwapError> {
        self.constants()
            .exchange
            .ok_or(SwapError::ExchangeUnavailable(*self))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(SwapError::Config(format!("unknown network '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_sets_are_distinct() {
        assert_ne!(
            Network::Mainnet.wal_coin_type(),
            Network::Testnet.wal_coin_type()
        );
        assert!(Network::Testnet.constants().fixed_parity);
        assert!(!Network::Mainnet.constants().fixed_parity);
    }

    #[test]
    fn test_exchange_target() {
        let exchange = Network::Testnet.exchange().unwrap();
        assert_eq!(
            exchange.target(),
            "0x82593828ed3fcb8c6a235eac9abd0adbe9c5f9bbffa9b1e7a45cdd884481ef9f::wal_exchange::exchange_all_for_wal"
        );
        assert!(matches!(
            Network::Mainnet.exchange(),
            Err(SwapError::ExchangeUnavailable(Network::Mainnet))
        ));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" testnet ".parse::<Network>().unwrap(), Network::Testnet);
        assert!("devnet".parse::<Network>().is_err());
        assert_eq!(Network::Testnet.chain_id(), "sui:testnet");
        assert_eq!(Network::default(), Network::Testnet);
    }
}
