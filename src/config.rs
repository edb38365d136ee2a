use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Remote services
    pub directory_url: String,
    pub esr_service_url: String,

    // Local storage
    pub data_dir: String,

    // History paging
    pub actions_page_size: u32,

    // Transport
    pub request_timeout_secs: u64,

    pub environment: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            directory_url: env::var("CHAIN_DIRECTORY_URL")?,
            esr_service_url: env::var("ESR_SERVICE_URL")?,

            data_dir: env::var("WALLET_DATA_DIR").unwrap_or_else(|_| ".wallet-sync".to_string()),

            actions_page_size: env::var("ACTIONS_PAGE_SIZE")
                .unwrap_or_else(|_| crate::constants::DEFAULT_ACTIONS_PAGE_SIZE.to_string())
                .parse()?,

            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.directory_url.trim().is_empty() {
            anyhow::bail!("CHAIN_DIRECTORY_URL is empty");
        }
        if self.esr_service_url.trim().is_empty() {
            anyhow::bail!("ESR_SERVICE_URL is empty");
        }
        if let Err(e) = url::Url::parse(&self.directory_url) {
            anyhow::bail!("CHAIN_DIRECTORY_URL is not a valid URL: {e}");
        }
        if let Err(e) = url::Url::parse(&self.esr_service_url) {
            anyhow::bail!("ESR_SERVICE_URL is not a valid URL: {e}");
        }
        if self.data_dir.trim().is_empty() {
            anyhow::bail!("WALLET_DATA_DIR is empty");
        }

        if self.actions_page_size == 0 {
            tracing::warn!("ACTIONS_PAGE_SIZE is 0; history fetches will return nothing");
        }
        if self.request_timeout_secs == 0 {
            tracing::warn!("REQUEST_TIMEOUT_SECS is 0; remote calls may hang indefinitely");
        }
        if self.directory_url.starts_with("http://") && self.environment == "production" {
            tracing::warn!("Directory URL is plain http in production");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        self.environment == "development" || self.environment == "testnet"
    }
}
