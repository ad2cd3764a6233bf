//! Swap intent: what the user asked to convert and the derived receive amount

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SwapError;
use crate::network::{Network, SUI_COIN_TYPE};
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    Sui,
    Wal,
}

impl Token {
    pub fn symbol(&self) -> &'static str {
        match self {
            Token::Sui => "SUI",
            Token::Wal => "WAL",
        }
    }

    pub fn coin_type(&self, network: Network) -> &'static str {
        match self {
            Token::Sui => SUI_COIN_TYPE,
            Token::Wal => network.wal_coin_type(),
        }
    }

    pub fn other(&self) -> Token {
        match self {
            Token::Sui => Token::Wal,
            Token::Wal => Token::Sui,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Receive amount for `send_amount` at `rate`.
///
/// `None` when the rate is unknown (zero) or there is nothing to send.
pub fn derive_receive_amount(send_amount: Decimal, rate: Decimal) -> Option<Decimal> {
    if rate <= Decimal::ZERO || send_amount <= Decimal::ZERO {
        return None;
    }
    send_amount
        .checked_mul(rate)
        .map(units::round_display)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapIntent {
    pub send_token: Token,
    pub receive_token: Token,
    pub send_amount: Option<Decimal>,
    pub receive_amount: Option<Decimal>,
}

impl Default for SwapIntent {
    fn default() -> Self {
        Self {
            send_token: Token::Sui,
            receive_token: Token::Wal,
            send_amount: None,
            receive_amount: None,
        }
    }
}

impl SwapIntent {
    pub fn new(send_amount: Option<Decimal>) -> Self {
        Self {
            send_amount,
            ..Default::default()
        }
    }

    pub fn is_supported_direction(&self) -> bool {
        self.send_token == Token::Sui && self.receive_token == Token::Wal
    }

    /// Recompute the receive amount. Only SUI -> WAL is derived; the reverse
    /// direction keeps whatever was there (the transaction layer cannot
    /// execute it anyway).
    pub fn apply_rate(&mut self, rate: Decimal) {
        if !self.is_supported_direction() {
            return;
        }
        self.receive_amount = self
            .send_amount
            .and_then(|amount| derive_receive_amount(amount, rate));
    }

    pub fn set_send_amount(&mut self, amount: Option<Decimal>, rate: Decimal) {
        self.send_amount = amount;
        if self.is_supported_direction() {
            self.apply_rate(rate);
        }
    }

    /// Token-cycle action. The derived amount is cleared, not reversed.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.send_token, &mut self.receive_token);
        self.receive_amount = None;
    }

    /// Local pre-submission checks. Returns the send amount in base units.
    ///
    /// `available` is the last known SUI balance; `None` skips the balance
    /// check and leaves it to the chain.
    pub fn validate(&self, available: Option<u64>) -> Result<u64, SwapError> {
        if !self.is_supported_direction() {
            return Err(SwapError::UnsupportedDirection {
                from: self.send_token,
                to: self.receive_token,
            });
        }

        let amount = self
            .send_amount
            .ok_or_else(|| SwapError::InvalidAmount("no amount entered".to_string()))?;
        let requested = units::to_base_units(amount)?;

        if let Some(available) = available {
            if requested > available {
                return Err(SwapError::InsufficientBalance {
                    requested,
                    available,
                });
            }
        }

        Ok(requested)
    }
}
