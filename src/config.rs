use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub tiers: TierConfig,
    #[serde(default)]
    pub cards: CardConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Monetary parameters of the wallet
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WalletConfig {
    /// Display label only, there is a single currency
    pub currency: String,
    pub starting_balance: Decimal,
    /// Decimal places of the currency's minor unit
    pub minor_units: u32,
    /// Face amount per loyalty point earned
    pub points_divisor: Decimal,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            currency: "V$".to_string(),
            starting_balance: Decimal::new(20, 0),
            minor_units: 2,
            points_divisor: Decimal::new(50, 0),
        }
    }
}

/// Tier thresholds (points) and commission rates
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TierConfig {
    pub mid_threshold: u64,
    pub top_threshold: u64,
    pub base_rate: Decimal,
    pub mid_rate: Decimal,
    pub top_rate: Decimal,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            mid_threshold: 200,
            top_threshold: 1000,
            base_rate: Decimal::new(2, 2),
            mid_rate: Decimal::new(15, 3),
            top_rate: Decimal::new(1, 2),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CardConfig {
    pub prefix: String,
    pub max_attempts: u32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            prefix: "VY".to_string(),
            max_attempts: 16,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct JournalConfig {
    pub enabled: bool,
    pub path: String,
    /// fsync after every record
    pub sync_writes: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "./data/wallet.journal".to_string(),
            sync_writes: true,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}
