use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DhvConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let substituted = substitution::substitute_env_vars(&content)?;

    let config: DhvConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> DhvConfig {
    use defaults::*;

    DhvConfig {
        vault: VaultConfig {
            name: "dhv-main".to_string(),
            collateral_symbol: "USDC".to_string(),
            underlying_symbol: "ETH".to_string(),
            buffer_bps: default_buffer_bps(),
            initial_deposit: 1_000_000,
        },
        price_feed: PriceFeedConfig {
            static_prices: [("ETH".to_string(), 2_500.0)].into_iter().collect(),
            decimals: default_feed_decimals(),
            max_price_age_seconds: default_max_price_age(),
            sequencer_grace_period_seconds: None,
        },
        reactors: vec![
            ReactorConfig {
                kind: ReactorKind::Perp,
                health_factor_bps: default_health_factor_bps(),
                min_amount: default_min_amount(),
                fee_bps: 0,
                execution_delay_seconds: default_execution_delay(),
            },
            ReactorConfig {
                kind: ReactorKind::Gmx,
                health_factor_bps: default_health_factor_bps(),
                min_amount: default_min_amount(),
                fee_bps: 10,
                execution_delay_seconds: default_execution_delay(),
            },
        ],
        keeper: KeeperConfig::default(),
        monitoring: MonitoringConfig::default(),
        logging: LoggingConfig::default(),
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &DhvConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}
