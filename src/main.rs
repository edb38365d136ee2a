use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet_sync::auth::NoopAuthenticator;
use wallet_sync::crypto::Sha3Crypto;
use wallet_sync::keystore::FileKeyStore;
use wallet_sync::persist::FileStore;
use wallet_sync::transport::HttpTransport;
use wallet_sync::{ChainCatalog, Config, FetchPipeline, SigningRequestProtocol, SyncState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting wallet sync daemon");
    tracing::info!("Environment: {}", config.environment);

    let store = Arc::new(FileStore::new(&config.data_dir)?);
    let keystore = Arc::new(FileKeyStore::new(&config.data_dir)?);
    let transport = Arc::new(HttpTransport::new(&config)?);
    let crypto = Arc::new(Sha3Crypto);

    // Restore the published state from the last run
    let state = SyncState::restore(store.as_ref())?.shared();
    tracing::info!("Restored state: {}", state.read().await.summary());

    let catalog = ChainCatalog::new(transport.clone(), state.clone(), store.clone());
    let pipeline = FetchPipeline::new(
        transport.clone(),
        state.clone(),
        store.clone(),
        config.actions_page_size,
    );
    // The protocol is driven by incoming requests; constructed here so
    // the daemon owns one wired instance for its request surface.
    let _protocol = SigningRequestProtocol::new(
        state.clone(),
        transport.clone(),
        store.clone(),
        keystore,
        Arc::new(NoopAuthenticator),
        crypto,
    );

    catalog.refresh().await?;
    pipeline.reconcile_all().await?;

    tracing::info!("Sync complete: {}", state.read().await.summary());
    Ok(())
}
