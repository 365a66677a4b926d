use std::sync::Arc;
use std::time::Instant;

use crate::wallet::{Wallet, WalletError};

use super::types::ApiError;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub wallet: Arc<Wallet>,
    started_at: Instant,
}

impl AppState {
    pub fn new(wallet: Arc<Wallet>) -> Self {
        Self {
            wallet,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn minor_units(&self) -> u32 {
        self.wallet.config().minor_units
    }

    /// Run a wallet call off the async runtime. Mutations may fsync the
    /// journal, which must not stall a runtime worker.
    pub async fn run_blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Wallet) -> Result<T, WalletError> + Send + 'static,
        T: Send + 'static,
    {
        let wallet = self.wallet.clone();
        tokio::task::spawn_blocking(move || f(&wallet))
            .await
            .map_err(|e| ApiError::internal(format!("Wallet task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}
