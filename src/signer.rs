//! Wallet signing capability
//!
//! The exchange hook never holds key material. It hands a [`TransactionData`]
//! to a [`Signer`], which asks the wallet to sign and execute it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SignerError;
use crate::transaction::{ExecuteOptions, TransactionData};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub transaction: TransactionData,
    /// Wallet-standard chain id, e.g. `sui:testnet`
    pub chain: String,
    pub options: ExecuteOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_changes: Option<Vec<serde_json::Value>>,
}

/// Sign-and-execute capability provided by the connected wallet.
///
/// One call is one round trip. Implementations must not retry; the caller
/// decides whether to re-submit.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign_and_execute(
        &self,
        request: ExecuteRequest,
    ) -> Result<ExecutionResult, SignerError>;
}

/// Signer for processes with no wallet attached, such as a server that only
/// prepares transactions. Every request is refused without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSigner;

#[async_trait]
impl Signer for DetachedSigner {
    async fn sign_and_execute(
        &self,
        _request: ExecuteRequest,
    ) -> Result<ExecutionResult, SignerError> {
        Err(SignerError::Transport("no wallet attached".to_string()))
    }
}
