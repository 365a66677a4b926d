//! Loyalty Wallet - Gateway entry point
//!
//! Usage:
//!   loyalty_wallet [--env dev] [--port 8080]

use std::sync::Arc;

use anyhow::Context;
use loyalty_wallet::config::AppConfig;
use loyalty_wallet::{Wallet, gateway, logging};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    let _log_guard = logging::init_logging(&app_config);

    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    tracing::info!(
        env = %env,
        journal = app_config.journal.enabled,
        currency = %app_config.wallet.currency,
        "Starting loyalty wallet"
    );

    let wallet = {
        let config = app_config.clone();
        tokio::task::spawn_blocking(move || Wallet::open(&config))
            .await
            .context("Wallet startup task failed")?
            .context("Failed to open wallet")?
    };
    tracing::info!(
        accounts = wallet.accounts().len(),
        ledger_entries = wallet.ledger().len(),
        "Wallet ready"
    );

    gateway::run_server(&app_config.gateway, Arc::new(wallet)).await
}
