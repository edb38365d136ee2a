use crate::collection::IdentitySet;
use crate::constants::{
    STORE_KEY_ACCOUNTS, STORE_KEY_BALANCES, STORE_KEY_CONTRACTS, STORE_KEY_PROVIDERS,
    STORE_KEY_SESSIONS, STORE_KEY_TRANSFERS,
};
use crate::error::StoreError;
use crate::models::{
    Account, ChainProvider, EsrSession, SigningRequest, TokenBalance, TokenContract,
    TokenTransferAction,
};
use crate::persist::{Store, StoreExt};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle to the published aggregate, injected into every component
/// that mutates it. Constructed once on startup; the write lock
/// serializes concurrent fan-in merges.
pub type SharedState = Arc<RwLock<SyncState>>;

/// The published aggregate the application observes: all synchronized
/// collections plus the current signing request and authorized sessions.
///
/// Mutated only by the catalog, the fetch pipeline, key import, and the
/// signing protocol; consumers read, never write.
#[derive(Debug, Default, Clone)]
pub struct SyncState {
    pub providers: IdentitySet<ChainProvider>,
    pub token_contracts: IdentitySet<TokenContract>,
    pub accounts: IdentitySet<Account>,
    pub balances: IdentitySet<TokenBalance>,
    pub transfers: IdentitySet<TokenTransferAction>,
    pub sessions: IdentitySet<EsrSession>,
    /// At most one outstanding external signing request; transient.
    pub current_request: Option<SigningRequest>,
}

impl SyncState {
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    pub fn provider(&self, chain_id: &str) -> Option<&ChainProvider> {
        self.providers.get(&chain_id.to_string())
    }

    /// Upsert a balance, synthesizing a blacklisted placeholder contract
    /// when the balance references one the catalog does not know. Every
    /// merged balance therefore always has a resolvable contract entry.
    pub fn merge_balance(&mut self, balance: TokenBalance) {
        let contract_key = balance.contract_key();
        if !self.token_contracts.contains(&contract_key) {
            self.token_contracts.upsert(TokenContract::placeholder(
                &balance.chain_id,
                &balance.contract,
                &balance.symbol,
            ));
        }
        self.balances.upsert(balance);
    }

    /// Load the persisted collections; absent keys restore as empty.
    pub fn restore(store: &dyn Store) -> Result<Self, StoreError> {
        Ok(Self {
            providers: store.load_json(STORE_KEY_PROVIDERS)?.unwrap_or_default(),
            token_contracts: store.load_json(STORE_KEY_CONTRACTS)?.unwrap_or_default(),
            accounts: store.load_json(STORE_KEY_ACCOUNTS)?.unwrap_or_default(),
            balances: store.load_json(STORE_KEY_BALANCES)?.unwrap_or_default(),
            transfers: store.load_json(STORE_KEY_TRANSFERS)?.unwrap_or_default(),
            sessions: store.load_json(STORE_KEY_SESSIONS)?.unwrap_or_default(),
            current_request: None,
        })
    }

    /// Flush every persisted collection. The current request is
    /// deliberately not saved: it does not survive a restart.
    pub fn persist(&self, store: &dyn Store) -> Result<(), StoreError> {
        store.save_json(STORE_KEY_PROVIDERS, &self.providers)?;
        store.save_json(STORE_KEY_CONTRACTS, &self.token_contracts)?;
        store.save_json(STORE_KEY_ACCOUNTS, &self.accounts)?;
        store.save_json(STORE_KEY_BALANCES, &self.balances)?;
        store.save_json(STORE_KEY_TRANSFERS, &self.transfers)?;
        store.save_json(STORE_KEY_SESSIONS, &self.sessions)?;
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} providers, {} contracts, {} accounts, {} balances, {} transfers, {} sessions",
            self.providers.len(),
            self.token_contracts.len(),
            self.accounts.len(),
            self.balances.len(),
            self.transfers.len(),
            self.sessions.len(),
        )
    }
}
