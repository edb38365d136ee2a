use crate::crypto::Crypto;
use crate::error::{ImportError, TransportError};
use crate::keystore::KeyStore;
use crate::models::{Account, AccountKey, ChainProvider};
use crate::persist::Store;
use crate::state::SharedState;
use crate::sync::pipeline::FetchPipeline;
use crate::transport::Transport;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Resolves a private key to its controlled accounts across all known
/// chains and reconciles each newly discovered one.
#[derive(Clone)]
pub struct KeyImportFlow {
    transport: Arc<dyn Transport>,
    state: SharedState,
    store: Arc<dyn Store>,
    keystore: Arc<dyn KeyStore>,
    crypto: Arc<dyn Crypto>,
    pipeline: FetchPipeline,
}

impl KeyImportFlow {
    pub fn new(
        transport: Arc<dyn Transport>,
        state: SharedState,
        store: Arc<dyn Store>,
        keystore: Arc<dyn KeyStore>,
        crypto: Arc<dyn Crypto>,
        pipeline: FetchPipeline,
    ) -> Self {
        Self {
            transport,
            state,
            store,
            keystore,
            crypto,
            pipeline,
        }
    }

    /// Import private-key material: derive its public key, discover the
    /// accounts it controls on every known provider, and reconcile the
    /// previously untracked ones. The key is persisted once, and only
    /// when at least one new account was discovered.
    pub async fn import_key(&self, private_key: &str) -> Result<Vec<AccountKey>, ImportError> {
        let public_key = self
            .crypto
            .derive_public_key(private_key)
            .map_err(|_| ImportError::InvalidKey)?;

        let providers: Vec<ChainProvider> = {
            let state = self.state.read().await;
            state.providers.iter().cloned().collect()
        };

        let mut branches = JoinSet::new();
        for provider in providers.clone() {
            let transport = self.transport.clone();
            let public_key = public_key.clone();
            branches.spawn(async move {
                let result = transport.find_key_accounts(&provider, &public_key).await;
                (provider.chain_id, result)
            });
        }

        let mut discovered: Vec<AccountKey> = Vec::new();
        let mut first_error: Option<TransportError> = None;
        let mut failures = 0usize;
        while let Some(joined) = branches.join_next().await {
            let Ok((chain_id, result)) = joined else {
                failures += 1;
                continue;
            };
            match result {
                Ok(names) => {
                    for name in names {
                        let key = (chain_id.clone(), name);
                        if !discovered.contains(&key) {
                            discovered.push(key);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(%chain_id, error = %e, "key account discovery failed");
                    failures += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        // All providers failing means nothing was actually searched.
        if !providers.is_empty() && failures == providers.len() {
            return Err(ImportError::Discovery(first_error.unwrap_or_else(|| {
                TransportError::Request("all providers failed".to_string())
            })));
        }

        let new_accounts: Vec<AccountKey> = {
            let state = self.state.read().await;
            discovered
                .into_iter()
                .filter(|key| !state.accounts.contains(key))
                .collect()
        };
        if new_accounts.is_empty() {
            tracing::info!("key controls no untracked accounts");
            return Ok(Vec::new());
        }

        self.keystore.store_key(&public_key, private_key)?;

        {
            let mut state = self.state.write().await;
            for key in &new_accounts {
                let mut account = Account::new(&key.0, &key.1);
                account.stored_key = Some(public_key.clone());
                state.accounts.upsert(account);
            }
        }
        tracing::info!(accounts = new_accounts.len(), "imported accounts");

        let mut branches = JoinSet::new();
        for key in new_accounts.clone() {
            let pipeline = self.pipeline.clone();
            branches.spawn(async move {
                pipeline.run_stages(&key).await;
            });
        }
        while branches.join_next().await.is_some() {}

        self.state.read().await.persist(self.store.as_ref())?;
        Ok(new_accounts)
    }
}
