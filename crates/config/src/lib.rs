use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DhvConfig {
    pub vault: VaultConfig,
    #[serde(rename = "price_feed")]
    pub price_feed: PriceFeedConfig,
    pub reactors: Vec<ReactorConfig>,
    #[serde(default)]
    pub keeper: KeeperConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultConfig {
    pub name: String,
    #[serde(rename = "collateral_symbol")]
    pub collateral_symbol: String,
    #[serde(rename = "underlying_symbol")]
    pub underlying_symbol: String,
    /// Share of liquid collateral kept undeployed, in basis points
    #[serde(rename = "buffer_bps")]
    #[serde(default = "default_buffer_bps")]
    pub buffer_bps: i64,
    /// Initial pool collateral in whole units
    #[serde(rename = "initial_deposit")]
    pub initial_deposit: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceFeedConfig {
    /// Static prices keyed by asset symbol, quoted in the collateral
    /// currency. Example YAML:
    /// ```yaml
    /// static_prices:
    ///   ETH: 2500.0
    /// ```
    #[serde(rename = "static_prices")]
    pub static_prices: HashMap<String, f64>,
    /// Decimals the simulated aggregators publish at
    #[serde(default = "default_feed_decimals")]
    pub decimals: u32,
    #[serde(rename = "max_price_age_seconds")]
    #[serde(default = "default_max_price_age")]
    pub max_price_age_seconds: u64,
    /// Enables the sequencer uptime check when set
    #[serde(rename = "sequencer_grace_period_seconds")]
    #[serde(default)]
    pub sequencer_grace_period_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactorKind {
    Perp,
    Gmx,
    Spot,
}

impl std::fmt::Display for ReactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactorKind::Perp => write!(f, "perp"),
            ReactorKind::Gmx => write!(f, "gmx"),
            ReactorKind::Spot => write!(f, "spot"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReactorConfig {
    pub kind: ReactorKind,
    /// Collateralization target in basis points (10000 = fully
    /// collateralized, 5000 = 2x leverage)
    #[serde(rename = "health_factor_bps")]
    #[serde(default = "default_health_factor_bps")]
    pub health_factor_bps: i64,
    /// Smallest hedge worth acting on, in delta units
    #[serde(rename = "min_amount")]
    #[serde(default = "default_min_amount")]
    pub min_amount: f64,
    /// Venue taker / pool fee
    #[serde(rename = "fee_bps")]
    #[serde(default)]
    pub fee_bps: u32,
    /// Keeper execution delay for asynchronous venues
    #[serde(rename = "execution_delay_seconds")]
    #[serde(default = "default_execution_delay")]
    pub execution_delay_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeeperConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "interval_seconds")]
    #[serde(default = "default_keeper_interval")]
    pub interval_seconds: u64,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_keeper_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    #[serde(rename = "metrics_enabled")]
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,
    #[serde(rename = "metrics_port")]
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: default_enabled(),
            metrics_port: default_metrics_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}
