//! Chain Mock Library
//!
//! In-process stand-in for a Sui fullnode (`suix_getBalance`) and the
//! DexScreener token endpoint, with control routes for seeding state.

pub mod handlers;
pub mod ledger;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use ledger::{MockLedger, MockPrice, SUI_COIN_TYPE};
pub use server::{create_router, run_server, spawn};
pub use types::*;
