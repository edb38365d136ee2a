use super::{
    ChainAccountInfo, DirectoryEntry, ProfileInfo, RawBalance, SignedSubmission, SubmitAck,
    TokenContractRow, Transport, TransferRow,
};
use crate::config::Config;
use crate::constants::{
    ESR_CALLBACK, ESR_REVOKE, HISTORY_GET_ACTIONS, HISTORY_GET_CONTRACTS,
    HISTORY_GET_KEY_ACCOUNTS, HISTORY_GET_TOKENS, PROFILE_CONTRACT, PROFILE_TABLE,
    RPC_GET_ACCOUNT, RPC_GET_TABLE_ROWS,
};
use crate::error::TransportError;
use crate::models::ChainProvider;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn table_rows_params(code: &str, table: &str, scope: &str, lower_bound: &str) -> serde_json::Value {
    serde_json::json!({
        "code": code,
        "table": table,
        "scope": scope,
        "lower_bound": lower_bound,
        "upper_bound": lower_bound,
        "limit": 1,
        "json": true
    })
}

/// HTTP transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    directory_url: String,
    esr_service_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            directory_url: config.directory_url.clone(),
            esr_service_url: config.esr_service_url.clone(),
        })
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Self::decode(response).await
    }
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    tokens: Vec<RawBalance>,
}

#[derive(Debug, Deserialize)]
struct ContractsResponse {
    contracts: Vec<TokenContractRow>,
}

#[derive(Debug, Deserialize)]
struct ActionsResponse {
    actions: Vec<TransferRow>,
}

#[derive(Debug, Deserialize)]
struct KeyAccountsResponse {
    account_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TableRowsResponse<T> {
    rows: Vec<T>,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_directory(&self) -> Result<Vec<DirectoryEntry>, TransportError> {
        self.get_json(&self.directory_url, &[]).await
    }

    async fn fetch_token_contracts(
        &self,
        provider: &ChainProvider,
    ) -> Result<Vec<TokenContractRow>, TransportError> {
        let url = join_url(&provider.history_url, HISTORY_GET_CONTRACTS);
        let response: ContractsResponse = self
            .get_json(&url, &[("chain", provider.chain_id.clone())])
            .await?;
        Ok(response.contracts)
    }

    async fn fetch_account(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<ChainAccountInfo, TransportError> {
        let url = join_url(&provider.rpc_url, RPC_GET_ACCOUNT);
        self.post_json(&url, &serde_json::json!({ "account_name": account }))
            .await
    }

    async fn fetch_profile(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<Option<ProfileInfo>, TransportError> {
        let url = join_url(&provider.rpc_url, RPC_GET_TABLE_ROWS);
        let params = table_rows_params(PROFILE_CONTRACT, PROFILE_TABLE, PROFILE_CONTRACT, account);
        let response: TableRowsResponse<ProfileInfo> = self.post_json(&url, &params).await?;
        Ok(response.rows.into_iter().next())
    }

    async fn fetch_balances(
        &self,
        provider: &ChainProvider,
        account: &str,
    ) -> Result<Vec<RawBalance>, TransportError> {
        let url = join_url(&provider.history_url, HISTORY_GET_TOKENS);
        let response: TokensResponse = self
            .get_json(&url, &[("account", account.to_string())])
            .await?;
        Ok(response.tokens)
    }

    async fn fetch_transfers(
        &self,
        provider: &ChainProvider,
        account: &str,
        contract: &str,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<TransferRow>, TransportError> {
        let url = join_url(&provider.history_url, HISTORY_GET_ACTIONS);
        let response: ActionsResponse = self
            .get_json(
                &url,
                &[
                    ("account", account.to_string()),
                    ("filter", format!("{contract}:transfer")),
                    ("symbol", symbol.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(response.actions)
    }

    async fn find_key_accounts(
        &self,
        provider: &ChainProvider,
        public_key: &str,
    ) -> Result<Vec<String>, TransportError> {
        let url = join_url(&provider.history_url, HISTORY_GET_KEY_ACCOUNTS);
        let response: KeyAccountsResponse = self
            .get_json(&url, &[("public_key", public_key.to_string())])
            .await?;
        Ok(response.account_names)
    }

    async fn submit_callback(
        &self,
        submission: &SignedSubmission,
    ) -> Result<SubmitAck, TransportError> {
        // Requests may carry their own callback endpoint; fall back to
        // the configured signing service.
        let url = submission
            .callback
            .clone()
            .unwrap_or_else(|| join_url(&self.esr_service_url, ESR_CALLBACK));
        let body = serde_json::to_value(submission)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        self.post_json(&url, &body).await
    }

    async fn revoke_session(&self, session_id: &str) -> Result<(), TransportError> {
        let url = join_url(&self.esr_service_url, ESR_REVOKE);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "session_id": session_id }))
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(())
    }
}
