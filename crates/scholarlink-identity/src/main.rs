//! ScholarLink identity service — answers register, login, and
//! verify-token requests on the message bus.

use std::sync::Arc;

use clap::Parser;
use scholarlink_identity::{
    CredentialStore, IdentityConfig, IdentityService, KvCredentialStore, MemoryCredentialStore,
    StoreBackend, listener,
};
use tracing::info;

/// ScholarLink identity service.
#[derive(Parser, Debug)]
#[command(name = "scholarlink-identity", about = "ScholarLink identity service")]
struct Args {
    /// Keep principals in memory instead of JetStream (development only).
    #[arg(long)]
    memory: bool,

    /// NATS server URL (overrides `NATS_URL`).
    #[arg(long)]
    nats_url: Option<String>,
}

async fn run<S: CredentialStore>(
    client: async_nats::Client,
    store: S,
    config: &IdentityConfig,
) -> anyhow::Result<()> {
    let service = IdentityService::from_config(store, config)?;
    if let Some(admin) = &config.bootstrap_admin {
        service.ensure_bootstrap_admin(admin).await?;
    }
    listener::serve(client, Arc::new(service)).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = IdentityConfig::from_env()?;
    if let Some(url) = args.nats_url {
        config.nats_url = url;
    }
    if args.memory {
        config.store = StoreBackend::Memory;
    }

    info!(
        nats_url = %config.nats_url,
        store = ?config.store,
        token_ttl_secs = config.token_ttl.as_secs(),
        "starting identity service"
    );

    let client = async_nats::connect(config.nats_url.as_str()).await?;

    match config.store {
        StoreBackend::Memory => run(client, MemoryCredentialStore::new(), &config).await,
        StoreBackend::JetStream => {
            let js = async_nats::jetstream::new(client.clone());
            let store = KvCredentialStore::new(js).await?;
            run(client, store, &config).await
        }
    }
}
