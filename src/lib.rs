//! Credential intake gateway backed by a Vault KV v2 secrets engine.
//!
//! Submissions flow through [`pipeline::SubmissionPipeline`]: validate the
//! form input, allocate a clock-derived storage path, issue a create-only
//! (`cas: 0`) write against the store, and map the outcome back to the
//! caller. Nothing is persisted or logged locally; the store holds the only
//! copy of each credential pair.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod path;
pub mod pipeline;
pub mod sensitive;
pub mod state;
pub mod telemetry;
pub mod vault;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use config::AppConfig;
use path::{PathAllocator, TimestampAllocator};
use pipeline::SubmissionPipeline;
use vault::{SecretWriter, VaultWriteClient};

pub use state::AppState;
pub use telemetry::CorrelationId;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&config)?;

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind http listener on {addr}",
                addr = config.listen_addr
            )
        })?;
    let http_addr = listener.local_addr()?;
    info!(%http_addr, vault_addr = %config.vault.addr, "login gateway listening");

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let writer = VaultWriteClient::new(config.vault.clone())?;
    let pipeline = SubmissionPipeline::new(
        Box::new(TimestampAllocator) as Box<dyn PathAllocator>,
        Box::new(writer) as Box<dyn SecretWriter>,
        config.max_write_attempts,
    );
    Ok(AppState::new(Arc::new(pipeline)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(?err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => warn!(?err, "failed to install sigterm handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
