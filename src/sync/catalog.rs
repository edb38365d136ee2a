use crate::error::FetchError;
use crate::models::TokenContract;
use crate::persist::Store;
use crate::state::SharedState;
use crate::transport::{TokenContractRow, Transport};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Holds the set of known chain providers and, per provider, the set of
/// known token contracts. Source of configuration for every fetch.
#[derive(Clone)]
pub struct ChainCatalog {
    transport: Arc<dyn Transport>,
    state: SharedState,
    store: Arc<dyn Store>,
}

impl ChainCatalog {
    pub fn new(transport: Arc<dyn Transport>, state: SharedState, store: Arc<dyn Store>) -> Self {
        Self {
            transport,
            state,
            store,
        }
    }

    /// Refresh providers from the remote directory, then the declared
    /// token contracts of every known provider.
    ///
    /// The directory fetch is the only aborting failure. The
    /// per-provider contract fetches fan out concurrently and join on
    /// completions: a failed provider is logged and skipped without
    /// aborting its siblings. Providers only ever gain or update
    /// entries; a provider missing from the directory but present from
    /// persisted state stays tracked. One flush after the join.
    pub async fn refresh(&self) -> Result<(), FetchError> {
        let entries = self.transport.fetch_directory().await?;
        tracing::info!(providers = entries.len(), "chain directory fetched");

        let providers = {
            let mut state = self.state.write().await;
            for entry in entries {
                state.providers.upsert(entry.into_provider());
            }
            state.providers.iter().cloned().collect::<Vec<_>>()
        };

        let mut branches = JoinSet::new();
        for provider in providers {
            let transport = self.transport.clone();
            branches.spawn(async move {
                let result = transport.fetch_token_contracts(&provider).await;
                (provider, result)
            });
        }

        // Barrier: every branch reports before the refresh completes,
        // regardless of how many failed.
        while let Some(joined) = branches.join_next().await {
            let Ok((provider, result)) = joined else {
                continue;
            };
            match result {
                Ok(rows) => {
                    let mut state = self.state.write().await;
                    for row in rows {
                        state
                            .token_contracts
                            .upsert(contract_from_row(&provider.chain_id, row));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        chain_id = %provider.chain_id,
                        error = %e,
                        "token contract fetch failed; skipping provider"
                    );
                }
            }
        }

        let state = self.state.read().await;
        state.persist(self.store.as_ref())?;
        tracing::info!(summary = %state.summary(), "catalog refresh complete");
        Ok(())
    }
}

fn contract_from_row(chain_id: &str, row: TokenContractRow) -> TokenContract {
    TokenContract {
        chain_id: chain_id.to_string(),
        contract: row.contract,
        symbol: row.symbol,
        issuer: row.issuer,
        supply: row.supply,
        max_supply: row.max_supply,
        name: row.name,
        logo_url: row.logo_url,
        blacklisted: false,
    }
}
