//! Create-only writes against the Vault KV v2 HTTP API.
//!
//! Every write asserts `cas: 0` ("create a version only if none exists"), so
//! the store itself arbitrates path collisions between concurrent
//! submissions. The client issues exactly one outbound attempt per call and
//! leaves any retry decision to the pipeline.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;

use crate::config::VaultConfig;
use crate::path::SecretPath;
use crate::pipeline::Credentials;

const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

// Fragment of the error Vault returns when the cas precondition fails; this
// is what distinguishes a collision from any other 400.
const CAS_VIOLATION_MARKER: &str = "check-and-set parameter did not match";

/// Classified result of one create-only write attempt.
///
/// Exactly one variant holds per call; callers match exhaustively instead of
/// inspecting raw status codes.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    /// The store confirmed a fresh first version at `path`.
    Stored { path: SecretPath },
    /// A version already exists at `path`; safe to retry on a new path.
    Conflict { path: SecretPath },
    /// Any other non-success answer. `detail` is the store's response body,
    /// carried as opaque diagnostic text.
    RejectedByStore { status: u16, detail: String },
    /// The request never completed (timeout, refused connection, DNS).
    TransportFailure { detail: String },
}

/// One create-only write per call; no retry inside the writer.
#[async_trait]
pub trait SecretWriter: Send + Sync {
    async fn create(&self, path: SecretPath, credentials: &Credentials) -> WriteOutcome;
}

#[async_trait]
impl<T: SecretWriter + ?Sized> SecretWriter for Box<T> {
    async fn create(&self, path: SecretPath, credentials: &Credentials) -> WriteOutcome {
        (**self).create(path, credentials).await
    }
}

#[derive(Clone)]
pub struct VaultWriteClient {
    config: Arc<VaultConfig>,
    client: Client,
}

impl VaultWriteClient {
    pub fn new(config: VaultConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build Vault HTTP client")?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    fn write_url(&self, path: &SecretPath) -> String {
        format!(
            "{addr}/v1/{mount}/data/{path}",
            addr = self.config.addr.trim_end_matches('/'),
            mount = self.config.kv_mount.trim_matches('/'),
            path = path.as_str()
        )
    }
}

#[async_trait]
impl SecretWriter for VaultWriteClient {
    async fn create(&self, path: SecretPath, credentials: &Credentials) -> WriteOutcome {
        let body = json!({
            "data": {
                "username": credentials.username,
                "password": credentials.password.expose(),
            },
            "options": { "cas": 0 },
        });

        let response = match self
            .client
            .post(self.write_url(&path))
            .header(VAULT_TOKEN_HEADER, self.config.token.expose())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return WriteOutcome::TransportFailure {
                    detail: format!("vault request failed: {err}"),
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(%path, "vault kv accepted create-only write");
            return WriteOutcome::Stored { path };
        }

        let detail = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && detail.contains(CAS_VIOLATION_MARKER) {
            debug!(%path, "vault kv reported an existing version");
            return WriteOutcome::Conflict { path };
        }
        WriteOutcome::RejectedByStore {
            status: status.as_u16(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitive::Sensitive;
    use std::time::Duration;

    fn client(addr: &str, mount: &str) -> VaultWriteClient {
        VaultWriteClient::new(VaultConfig {
            addr: addr.to_string(),
            token: Sensitive("root".to_string()),
            kv_mount: mount.to_string(),
            timeout: Duration::from_secs(1),
        })
        .expect("client")
    }

    #[test]
    fn write_url_targets_the_kv_data_endpoint() {
        let client = client("http://127.0.0.1:8200", "secret");
        let url = client.write_url(&SecretPath::new("1724400000123"));
        assert_eq!(url, "http://127.0.0.1:8200/v1/secret/data/logins/1724400000123");
    }

    #[test]
    fn write_url_tolerates_stray_slashes() {
        let client = client("http://127.0.0.1:8200/", "/kv/");
        let url = client.write_url(&SecretPath::new("42"));
        assert_eq!(url, "http://127.0.0.1:8200/v1/kv/data/logins/42");
    }
}
