//! Environment-resolved configuration, fixed once at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::sensitive::Sensitive;

const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";
const DEFAULT_VAULT_TOKEN: &str = "root";
const DEFAULT_KV_MOUNT: &str = "secret";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

/// Connection settings for the Vault KV v2 mount.
#[derive(Clone, Debug)]
pub struct VaultConfig {
    pub addr: String,
    pub token: Sensitive<String>,
    pub kv_mount: String,
    pub timeout: Duration,
}

/// Process configuration resolved from the environment once and passed down
/// explicitly; nothing reads ambient state after startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub vault: VaultConfig,
    pub max_write_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };
        let listen_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);

        let addr = std::env::var("VAULT_ADDR").unwrap_or_else(|_| DEFAULT_VAULT_ADDR.to_string());
        let token =
            std::env::var("VAULT_TOKEN").unwrap_or_else(|_| DEFAULT_VAULT_TOKEN.to_string());
        let kv_mount =
            std::env::var("VAULT_KV_MOUNT").unwrap_or_else(|_| DEFAULT_KV_MOUNT.to_string());
        let timeout = std::env::var("VAULT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let max_write_attempts = std::env::var("SUBMIT_MAX_ATTEMPTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_MAX_WRITE_ATTEMPTS);

        Ok(Self {
            listen_addr,
            vault: VaultConfig {
                addr,
                token: Sensitive(token),
                kv_mount,
                timeout,
            },
            max_write_attempts,
        })
    }
}
