use crate::error::FetchError;
use crate::models::{AccountKey, ChainProvider, TokenBalance, TokenTransferAction};
use crate::persist::Store;
use crate::state::SharedState;
use crate::transport::{Transport, TransferRow};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Multi-stage account reconciliation.
///
/// Stages run strictly sequentially per account; different accounts run
/// concurrently and merge into the shared collections under the
/// identity-upsert rule. A failed remote fetch never aborts an
/// account's pipeline: the stage keeps its previous value and the next
/// stage runs with whatever data is available.
#[derive(Clone)]
pub struct FetchPipeline {
    transport: Arc<dyn Transport>,
    state: SharedState,
    store: Arc<dyn Store>,
    actions_page_size: u32,
}

impl FetchPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        state: SharedState,
        store: Arc<dyn Store>,
        actions_page_size: u32,
    ) -> Self {
        Self {
            transport,
            state,
            store,
            actions_page_size,
        }
    }

    /// Reconcile every tracked account concurrently; the join counts
    /// completions, so one account's failures never block the rest.
    /// Flushes once after the barrier.
    pub async fn reconcile_all(&self) -> Result<(), FetchError> {
        let keys: Vec<AccountKey> = {
            let state = self.state.read().await;
            state.accounts.keys().collect()
        };
        tracing::info!(accounts = keys.len(), "reconciling all tracked accounts");

        let mut branches = JoinSet::new();
        for key in keys {
            let pipeline = self.clone();
            branches.spawn(async move {
                pipeline.run_stages(&key).await;
            });
        }
        while branches.join_next().await.is_some() {}

        let state = self.state.read().await;
        state.persist(self.store.as_ref())?;
        tracing::info!(summary = %state.summary(), "reconciliation pass complete");
        Ok(())
    }

    /// Reconcile one tracked account and flush.
    pub async fn reconcile_account(&self, key: &AccountKey) -> Result<(), FetchError> {
        if !self.state.read().await.accounts.contains(key) {
            return Err(FetchError::UnknownAccount(key.1.clone(), key.0.clone()));
        }
        self.run_stages(key).await;
        self.state.read().await.persist(self.store.as_ref())?;
        Ok(())
    }

    /// The four sequential stages. Runs to completion regardless of
    /// individual stage failures; no flush here so callers control the
    /// checkpoint.
    pub(crate) async fn run_stages(&self, key: &AccountKey) {
        let (chain_id, account) = key;
        let provider = {
            let state = self.state.read().await;
            state.provider(chain_id).cloned()
        };
        let Some(provider) = provider else {
            // No resolvable provider: every remote stage is a no-op.
            tracing::debug!(%chain_id, %account, "no provider; skipping remote stages");
            return;
        };

        self.fetch_chain_identity(&provider, key).await;
        self.fetch_profile(&provider, key).await;
        self.fetch_balances(&provider, key).await;
        self.fetch_history(&provider, key).await;
    }

    /// Stage 1: current permission set from the chain.
    async fn fetch_chain_identity(&self, provider: &ChainProvider, key: &AccountKey) {
        match self.transport.fetch_account(provider, &key.1).await {
            Ok(info) => {
                let mut state = self.state.write().await;
                if let Some(account) = state.accounts.get_mut(key) {
                    account.permissions = info.permissions;
                }
            }
            Err(e) => {
                tracing::warn!(account = %key.1, error = %e, "chain identity fetch failed");
            }
        }
    }

    /// Stage 2: user-registry profile fields.
    async fn fetch_profile(&self, provider: &ChainProvider, key: &AccountKey) {
        match self.transport.fetch_profile(provider, &key.1).await {
            Ok(Some(profile)) => {
                let mut state = self.state.write().await;
                if let Some(account) = state.accounts.get_mut(key) {
                    account.display_name = profile.display_name;
                    account.avatar_url = profile.avatar_url;
                    account.verified = profile.verified;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(account = %key.1, error = %e, "profile fetch failed");
            }
        }
    }

    /// Stage 3: full current balance set, synthesizing placeholder
    /// contracts for balances whose contract the catalog does not know.
    async fn fetch_balances(&self, provider: &ChainProvider, key: &AccountKey) {
        match self.transport.fetch_balances(provider, &key.1).await {
            Ok(rows) => {
                let mut state = self.state.write().await;
                for row in rows {
                    state.merge_balance(TokenBalance {
                        chain_id: key.0.clone(),
                        account: key.1.clone(),
                        contract: row.contract,
                        symbol: row.symbol,
                        amount: row.amount,
                    });
                }
            }
            Err(e) => {
                tracing::warn!(account = %key.1, error = %e, "balance fetch failed");
            }
        }
    }

    /// Stage 4: transfer history, fanned out per current balance and
    /// joined before the account counts as reconciled.
    async fn fetch_history(&self, provider: &ChainProvider, key: &AccountKey) {
        let balances: Vec<TokenBalance> = {
            let state = self.state.read().await;
            state
                .balances
                .iter()
                .filter(|b| b.chain_id == key.0 && b.account == key.1)
                .cloned()
                .collect()
        };

        let limit = self.actions_page_size;
        let branches = balances.into_iter().map(|balance| {
            let transport = self.transport.clone();
            let provider = provider.clone();
            let account = key.1.clone();
            async move {
                let result = transport
                    .fetch_transfers(&provider, &account, &balance.contract, &balance.symbol, limit)
                    .await;
                (balance, result)
            }
        });

        // Join on every balance before the account counts as reconciled.
        for (balance, result) in join_all(branches).await {
            match result {
                Ok(rows) => {
                    let mut state = self.state.write().await;
                    for row in rows {
                        state.transfers.upsert(transfer_from_row(key, row));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        account = %key.1,
                        contract = %balance.contract,
                        error = %e,
                        "history fetch failed"
                    );
                }
            }
        }
    }
}

fn transfer_from_row(key: &AccountKey, row: TransferRow) -> TokenTransferAction {
    let sent = row.from == key.1;
    TokenTransferAction {
        chain_id: key.0.clone(),
        tx_id: row.tx_id,
        account: key.1.clone(),
        contract: row.contract,
        symbol: row.symbol,
        from: row.from,
        to: row.to,
        quantity: row.quantity,
        memo: row.memo,
        timestamp: row.timestamp,
        sent,
    }
}
