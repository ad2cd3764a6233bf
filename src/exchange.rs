//! SUI -> WAL exchange hook
//!
//! Reads balances for the connected account and submits the single exchange
//! transaction through the wallet's signer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::account::{SuiAddress, WalletConnection};
use crate::error::SwapError;
use crate::network::{ExchangeDeployment, Network, SUI_COIN_TYPE};
use crate::rpc::BalanceReader;
use crate::signer::{DetachedSigner, ExecuteRequest, ExecutionResult, Signer};
use crate::transaction::{ExecuteOptions, TransactionBuilder, TransactionData};

/// Outcome of a WAL balance read that keeps "read failed" apart from "zero"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WalBalance {
    Available { amount: u64 },
    Unavailable { reason: String },
}

impl WalBalance {
    /// Collapse to a number; an unavailable balance reads as zero
    pub fn amount_or_zero(&self) -> u64 {
        match self {
            WalBalance::Available { amount } => *amount,
            WalBalance::Unavailable { .. } => 0,
        }
    }
}

/// Assemble the exchange transaction:
/// split `amount` from gas, call the exchange, send the WAL coin back.
pub fn build_exchange_transaction(
    sender: &SuiAddress,
    amount: u64,
    deployment: &ExchangeDeployment,
) -> Result<TransactionData, SwapError> {
    if amount == 0 {
        return Err(SwapError::InvalidAmount("amount must be positive".to_string()));
    }

    let mut tx = TransactionBuilder::new();
    tx.set_sender(sender.clone());

    let gas = tx.gas();
    let amount_arg = tx.pure_u64(amount);
    let coins = tx.split_coins(gas, vec![amount_arg]);

    let exchange = tx.object(deployment.exchange_object_id);
    let mut arguments = vec![exchange];
    arguments.extend(coins);
    let wal_coin = tx.move_call(&deployment.target(), Vec::new(), arguments)?;

    let recipient = tx.pure_address(sender.clone());
    tx.transfer_objects(vec![wal_coin], recipient);

    tx.build()
}

pub struct ExchangeHook {
    network: Network,
    connection: WalletConnection,
    balances: Arc<dyn BalanceReader>,
    signer: Arc<dyn Signer>,
}

impl ExchangeHook {
    pub fn new(
        network: Network,
        connection: WalletConnection,
        balances: Arc<dyn BalanceReader>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self {
            network,
            connection,
            balances,
            signer,
        }
    }

    /// Hook that can read balances but refuses to submit anything
    pub fn read_only(network: Network, balances: Arc<dyn BalanceReader>) -> Self {
        Self::new(
            network,
            WalletConnection::new(),
            balances,
            Arc::new(DetachedSigner),
        )
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn connection(&self) -> &WalletConnection {
        &self.connection
    }

    fn resolve_owner(&self, address: Option<&SuiAddress>) -> Result<SuiAddress, SwapError> {
        address
            .cloned()
            .or_else(|| self.connection.address())
            .ok_or(SwapError::NotConnected)
    }

    /// SUI balance in MIST
    pub async fn get_sui_balance(&self, address: Option<&SuiAddress>) -> Result<u64, SwapError> {
        let owner = self.resolve_owner(address)?;
        let balance = self.balances.get_balance(&owner, SUI_COIN_TYPE).await?;
        Ok(balance.total_balance)
    }

    /// WAL balance, keeping read failures distinguishable from zero
    pub async fn read_wal_balance(
        &self,
        address: Option<&SuiAddress>,
    ) -> Result<WalBalance, SwapError> {
        let owner = self.resolve_owner(address)?;
        match self
            .balances
            .get_balance(&owner, self.network.wal_coin_type())
            .await
        {
            Ok(balance) => Ok(WalBalance::Available {
                amount: balance.total_balance,
            }),
            Err(e) => {
                log::warn!("Error fetching WAL balance for {}: {}", owner, e);
                Ok(WalBalance::Unavailable {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// WAL balance in base units. A failed read is reported as zero, since an
    /// account that never held WAL makes the node return an error.
    pub async fn get_wal_balance(&self, address: Option<&SuiAddress>) -> Result<u64, SwapError> {
        Ok(self.read_wal_balance(address).await?.amount_or_zero())
    }

    /// Convert `amount` MIST of SUI into WAL via the on-chain exchange.
    ///
    /// One wallet round trip, no retries. Every wallet failure comes back as
    /// `RemoteRejected`.
    pub async fn convert_sui_to_wal(&self, amount: u64) -> Result<ExecutionResult, SwapError> {
        let sender = self.connection.address().ok_or(SwapError::NotConnected)?;
        let deployment = self.network.exchange()?;
        let transaction = build_exchange_transaction(&sender, amount, &deployment)?;

        log::info!(
            "Submitting SUI -> WAL exchange: {} MIST from {} on {}",
            amount,
            sender,
            self.network
        );

        let result = self
            .signer
            .sign_and_execute(ExecuteRequest {
                transaction,
                chain: self.network.chain_id(),
                options: ExecuteOptions::default(),
            })
            .await
            .map_err(|e| {
                log::warn!("Exchange rejected: {}", e);
                SwapError::RemoteRejected(e)
            })?;

        if result.digest.trim().is_empty() {
            return Err(SwapError::RemoteRejected(
                crate::error::SignerError::MissingDigest,
            ));
        }

        log::info!("Exchange executed: digest={}", result.digest);
        Ok(result)
    }
}
