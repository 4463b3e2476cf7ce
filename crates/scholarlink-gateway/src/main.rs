//! ScholarLink gateway — HTTP front door for the identity service.

use clap::Parser;
use scholarlink_gateway::{GatewayConfig, router};
use scholarlink_sdk::IdentityClient;
use tracing::info;

/// ScholarLink HTTP gateway.
#[derive(Parser, Debug)]
#[command(name = "scholarlink-gateway", about = "ScholarLink HTTP gateway")]
struct Args {
    /// Port to listen on (overrides `GATEWAY_PORT`).
    #[arg(long)]
    port: Option<u16>,

    /// NATS server URL (overrides `NATS_URL`).
    #[arg(long)]
    nats_url: Option<String>,
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
    let mut config = GatewayConfig::from_env();
    if let Some(port) = args.port {
        config.listen_port = port;
    }
    if let Some(url) = args.nats_url {
        config.nats_url = url;
    }

    info!(
        nats_url = %config.nats_url,
        instance = %config.instance,
        prefix = %config.route_prefix,
        origins = ?config.allowed_origins,
        timeout_ms = config.upstream_timeout.as_millis(),
        "starting gateway"
    );

    let identity =
        IdentityClient::connect(&config.nats_url, &config.instance, config.upstream_timeout)
            .await?;
    let app = router(identity, &config);

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
