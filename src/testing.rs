//! Shared in-memory collaborators for unit tests.

use crate::auth::Authenticator;
use crate::crypto::{Crypto, Sha3Crypto};
use crate::error::{AuthError, KeyError, StoreError, TransportError};
use crate::keystore::KeyStore;
use crate::models::{ChainProvider, ResolvedTransaction};
use crate::persist::Store;
use crate::transport::{
    ChainAccountInfo, DirectoryEntry, ProfileInfo, RawBalance, SignedSubmission, SubmitAck,
    TokenContractRow, Transport, TransferRow,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn provider(chain_id: &str) -> ChainProvider {
    ChainProvider {
        chain_id: chain_id.to_string(),
        name: chain_id.to_uppercase(),
        rpc_url: format!("https://rpc.{chain_id}.example"),
        history_url: format!("https://history.{chain_id}.example"),
        icon_url: None,
        token_contracts: Vec::new(),
    }
}

pub fn directory_entry(chain_id: &str) -> DirectoryEntry {
    DirectoryEntry {
        chain_id: chain_id.to_string(),
        name: chain_id.to_uppercase(),
        rpc_url: format!("https://rpc.{chain_id}.example"),
        history_url: format!("https://history.{chain_id}.example"),
        icon_url: None,
        token_contracts: Vec::new(),
    }
}

pub fn contract_row(contract: &str, symbol: &str) -> TokenContractRow {
    TokenContractRow {
        contract: contract.to_string(),
        symbol: symbol.to_string(),
        issuer: Some("issuer".to_string()),
        supply: rust_decimal::Decimal::new(1000, 0),
        max_supply: rust_decimal::Decimal::new(10_000, 0),
        name: None,
        logo_url: None,
    }
}

/// Programmable transport: absent stubs answer with a transport error,
/// which doubles as failure injection.
#[derive(Default)]
pub struct MockTransport {
    pub directory: Mutex<Option<Vec<DirectoryEntry>>>,
    /// chain_id -> declared token contracts
    pub token_contracts: Mutex<HashMap<String, Vec<TokenContractRow>>>,
    /// (chain_id, account) -> chain account info
    pub accounts: Mutex<HashMap<(String, String), ChainAccountInfo>>,
    /// (chain_id, account) -> profile row (None = registered nowhere)
    pub profiles: Mutex<HashMap<(String, String), Option<ProfileInfo>>>,
    /// (chain_id, account) -> balances
    pub balances: Mutex<HashMap<(String, String), Vec<RawBalance>>>,
    /// (chain_id, account, contract, symbol) -> transfer rows
    pub transfers: Mutex<HashMap<(String, String, String, String), Vec<TransferRow>>>,
    /// chain_id -> account names controlled by the queried key
    pub key_accounts: Mutex<HashMap<String, Vec<String>>>,
    pub submit_ack: Mutex<Option<SubmitAck>>,
    pub revoke_ok: Mutex<bool>,

    pub directory_calls: AtomicUsize,
    pub contract_calls: AtomicUsize,
    pub account_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub transfer_calls: AtomicUsize,
    pub key_account_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub revoke_calls: AtomicUsize,
    pub last_transfer_limit: AtomicU32,
}

fn unstubbed(what: &str) -> TransportError {
    TransportError::Request(format!("no stub for {what}"))
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch_directory(&self) -> Result<Vec<DirectoryEntry>, TransportError> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        self.directory
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| unstubbed("directory"))
    }

    async fn fetch_token_contracts(
        &self,
        provider: &ChainProvider,
    ) -> Result<Vec<TokenContractRow>, TransportError> {
        self.contract_calls.fetch_add(1, Ordering::SeqCst);
        self.token_contracts
            .lock()
            .unwrap()
            .get(&provider.chain_id)
            .cloned()
            .ok_or_else(|| unstubbed("token_contracts"))
    }

    async fn fetch_account(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<ChainAccountInfo, TransportError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .lock()
            .unwrap()
            .get(&(provider.chain_id.clone(), account.to_string()))
            .cloned()
            .ok_or_else(|| unstubbed("account"))
    }

    async fn fetch_profile(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<Option<ProfileInfo>, TransportError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .unwrap()
            .get(&(provider.chain_id.clone(), account.to_string()))
            .cloned()
            .ok_or_else(|| unstubbed("profile"))
    }

    async fn fetch_balances(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<Vec<RawBalance>, TransportError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balances
            .lock()
            .unwrap()
            .get(&(provider.chain_id.clone(), account.to_string()))
            .cloned()
            .ok_or_else(|| unstubbed("balances"))
    }

    async fn fetch_transfers(
        &self,
        provider: &ChainProvider,
        account: &str,
        contract: &str,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<TransferRow>, TransportError> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        self.last_transfer_limit.store(limit, Ordering::SeqCst);
        self.transfers
            .lock()
            .unwrap()
            .get(&(
                provider.chain_id.clone(),
                account.to_string(),
                contract.to_string(),
                symbol.to_string(),
            ))
            .cloned()
            .ok_or_else(|| unstubbed("transfers"))
    }

    async fn find_key_accounts(
        &self,
        provider: &ChainProvider,
        _public_key: &str,
    ) -> Result<Vec<String>, TransportError> {
        self.key_account_calls.fetch_add(1, Ordering::SeqCst);
        self.key_accounts
            .lock()
            .unwrap()
            .get(&provider.chain_id)
            .cloned()
            .ok_or_else(|| unstubbed("key_accounts"))
    }

    async fn submit_callback(
        &self,
        _submission: &SignedSubmission,
    ) -> Result<SubmitAck, TransportError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit_ack
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| unstubbed("submit"))
    }

    async fn revoke_session(&self, _session_id: &str) -> Result<(), TransportError> {
        self.revoke_calls.fetch_add(1, Ordering::SeqCst);
        if *self.revoke_ok.lock().unwrap() {
            Ok(())
        } else {
            Err(TransportError::Status(503))
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub entries: Mutex<HashMap<String, Vec<u8>>>,
    pub save_calls: AtomicUsize,
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryKeyStore {
    pub keys: Mutex<HashMap<String, String>>,
    pub store_calls: AtomicUsize,
}

impl KeyStore for MemoryKeyStore {
    fn store_key(&self, public_key: &str, private_key: &str) -> Result<(), StoreError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        self.keys
            .lock()
            .unwrap()
            .insert(public_key.to_string(), private_key.to_string());
        Ok(())
    }

    fn private_key(&self, public_key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.keys.lock().unwrap().get(public_key).cloned())
    }
}

pub struct StaticAuthenticator {
    pub allow: bool,
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self) -> Result<(), AuthError> {
        if self.allow {
            Ok(())
        } else {
            Err(AuthError::Denied)
        }
    }
}

/// Sha3Crypto wrapper that counts signature computations.
#[derive(Default)]
pub struct CountingCrypto {
    inner: Sha3Crypto,
    pub sign_calls: AtomicUsize,
}

impl Crypto for CountingCrypto {
    fn derive_public_key(&self, private_key: &str) -> Result<String, KeyError> {
        self.inner.derive_public_key(private_key)
    }

    fn transaction_digest(&self, chain_id: &str, tx: &ResolvedTransaction) -> [u8; 32] {
        self.inner.transaction_digest(chain_id, tx)
    }

    fn sign_digest(&self, private_key: &str, digest: &[u8; 32]) -> Result<String, KeyError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_digest(private_key, digest)
    }
}
