//! blobgate server binary.
//!
//! Issues time-limited, permission-scoped container SAS tokens. The storage
//! connection string lives in a Key Vault secret; the process authenticates
//! to the vault with its ambient identity.
//!
//! # Example
//!
//! ```bash
//! blobgate-server \
//!   --vault-uri https://example-vault.vault.azure.net \
//!   --secret-name storageConnectionString \
//!   --listen 0.0.0.0:8080
//! ```

use anyhow::Result;
use blobgate_azure::provide_token::DefaultTokenProvider;
use blobgate_azure::VaultSecretProvider;
use blobgate_core::{Context, OsEnv};
use blobgate_server::{router, AppState, ReqwestHttpSend, ServerConfig};
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Issue scoped storage delegation tokens backed by a secrets vault.
#[derive(Parser, Debug)]
#[command(name = "blobgate-server")]
struct Args {
    /// Base URI of the key vault, e.g. https://example-vault.vault.azure.net
    #[arg(long)]
    vault_uri: Option<String>,

    /// Name of the vault secret holding the storage connection string
    #[arg(long)]
    secret_name: Option<String>,

    /// Container the issued tokens are scoped to
    #[arg(long)]
    container: Option<String>,

    /// Informational message returned with every token
    #[arg(long)]
    message: Option<String>,

    /// Listen address
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let ctx = Context::new()
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::default());

    let mut config = ServerConfig::default().from_env(&ctx);
    if let Some(v) = args.vault_uri {
        config.vault_uri = v;
    }
    if let Some(v) = args.secret_name {
        config.secret_name = v;
    }
    if let Some(v) = args.container {
        config.container_name = v;
    }
    if let Some(v) = args.message {
        config.message = v;
    }
    if let Some(v) = args.listen {
        config.listen = v;
    }
    config.validate()?;

    let secrets = VaultSecretProvider::new(
        config.vault_uri.clone(),
        config.secret_name.clone(),
        DefaultTokenProvider::new(),
    );

    let listen = config.listen.clone();
    let state = AppState::new(ctx, config, secrets);
    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("listening on {listen}");
    axum::serve(listener, app).await?;

    Ok(())
}
