pub mod http;

pub use http::HttpTransport;

use crate::error::TransportError;
use crate::models::{ChainProvider, ContractRef, Permission, ResolvedTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque remote access used by the sync engine: chain RPC, history
/// index, and the signing-request service. One typed operation per
/// remote question; every failure is a [`TransportError`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Authoritative list of chain providers from the remote directory.
    async fn fetch_directory(&self) -> Result<Vec<DirectoryEntry>, TransportError>;

    /// The token contracts a provider declares.
    async fn fetch_token_contracts(
        &self,
        provider: &ChainProvider,
    ) -> Result<Vec<TokenContractRow>, TransportError>;

    /// Current on-chain permission set of an account.
    async fn fetch_account(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<ChainAccountInfo, TransportError>;

    /// User-registry profile row, if the account has one.
    async fn fetch_profile(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<Option<ProfileInfo>, TransportError>;

    /// Full current token-balance set of an account.
    async fn fetch_balances(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<Vec<RawBalance>, TransportError>;

    /// Transfer actions naming `account` on one contract/symbol, newest
    /// first, bounded by `limit`.
    async fn fetch_transfers(
        &self,
        provider: &ChainProvider,
        account: &str,
        contract: &str,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<TransferRow>, TransportError>;

    /// Names of accounts controlled by a public key on one provider.
    async fn find_key_accounts(
        &self,
        provider: &ChainProvider,
        public_key: &str,
    ) -> Result<Vec<String>, TransportError>;

    /// Deliver a signed payload to the signing-request service.
    async fn submit_callback(
        &self,
        submission: &SignedSubmission,
    ) -> Result<SubmitAck, TransportError>;

    /// Notify the signing-request service that a session was revoked.
    async fn revoke_session(&self, session_id: &str) -> Result<(), TransportError>;
}

/// One provider as listed by the remote directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub chain_id: String,
    pub name: String,
    pub rpc_url: String,
    pub history_url: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub token_contracts: Vec<ContractRef>,
}

impl DirectoryEntry {
    pub fn into_provider(self) -> ChainProvider {
        ChainProvider {
            chain_id: self.chain_id,
            name: self.name,
            rpc_url: self.rpc_url,
            history_url: self.history_url,
            icon_url: self.icon_url,
            token_contracts: self.token_contracts,
        }
    }
}

/// One token contract as declared by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenContractRow {
    pub contract: String,
    pub symbol: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub supply: Decimal,
    #[serde(default)]
    pub max_supply: Decimal,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainAccountInfo {
    pub account_name: String,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInfo {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBalance {
    pub contract: String,
    pub symbol: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRow {
    pub tx_id: String,
    pub contract: String,
    pub symbol: String,
    pub from: String,
    pub to: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub memo: String,
    pub timestamp: DateTime<Utc>,
}

/// Signed payload delivered back to the signing-request service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedSubmission {
    pub session_id: String,
    pub transaction: ResolvedTransaction,
    pub signature: String,
    /// Per-submission nonce so replays of one session are distinguishable.
    pub nonce: String,
    #[serde(default)]
    pub callback: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub signer_display: Option<String>,
}
