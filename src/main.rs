use std::process;

use anyhow::Context;
use clap::Parser;

use vault_login_gateway::config::AppConfig;
use vault_login_gateway::telemetry;

#[derive(Parser)]
struct GatewayArgs {
    /// Override bind address (host:port)
    #[arg(long)]
    bind: Option<String>,
    /// Override the Vault server URL
    #[arg(long)]
    vault_addr: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = real_main().await {
        eprintln!("gateway exited with error: {err:#}");
        process::exit(1);
    }
}

async fn real_main() -> anyhow::Result<()> {
    telemetry::init()?;
    let args = GatewayArgs::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(bind) = &args.bind {
        config.listen_addr = bind.parse().context("invalid --bind address")?;
    }
    if let Some(vault_addr) = &args.vault_addr {
        config.vault.addr = vault_addr.clone();
    }

    vault_login_gateway::run(config).await
}
