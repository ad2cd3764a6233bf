//! HTTP API for the SUI -> WAL swap front end
//!
//! Serves preferences, rates, prices and balances, and prepares unsigned
//! exchange transactions. Signing stays in the browser wallet.

pub mod api;
pub mod error;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
