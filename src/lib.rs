//! Client-side wallet synchronization engine.
//!
//! Reconciles locally-cached chain state (accounts, token contracts,
//! balances, transfer history) against remote RPC and history-index
//! services, and implements the external signing-request (ESR)
//! protocol with revocable sessions.

pub mod auth;
pub mod collection;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod esr;
pub mod keystore;
pub mod models;
pub mod persist;
pub mod state;
pub mod sync;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use esr::SigningRequestProtocol;
pub use state::{SharedState, SyncState};
pub use sync::{ChainCatalog, FetchPipeline, KeyImportFlow};
