use crate::*;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Vault name is required")]
    MissingVaultName,

    #[error("No hedging reactors defined")]
    NoReactors,

    #[error("{field} must be between 0 and 10000 basis points, got {value}")]
    InvalidBpsRange { field: String, value: i64 },

    #[error("Static price for '{symbol}' must be positive, got {price}")]
    NonPositivePrice { symbol: String, price: f64 },

    #[error("No static price configured for underlying '{0}'")]
    MissingUnderlyingPrice(String),

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Reactor {index} ({kind}): {message}")]
    InvalidReactor {
        index: usize,
        kind: String,
        message: String,
    },

    #[error("Environment variable placeholder left unresolved in '{field}'")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

/// Validate a loaded configuration. Structural problems are errors;
/// "already present" style conditions are warnings only.
pub fn validate_config(config: &DhvConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.vault.name.trim().is_empty() {
        report.add_error(ValidationError::MissingVaultName);
    }
    if has_unresolved_env_vars(&config.vault.name) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "vault.name".to_string(),
        });
    }
    if !(0..=10_000).contains(&config.vault.buffer_bps) {
        report.add_error(ValidationError::InvalidBpsRange {
            field: "vault.buffer_bps".to_string(),
            value: config.vault.buffer_bps,
        });
    }
    if config.vault.initial_deposit == 0 {
        report.add_warning(
            "vault.initial_deposit",
            "pool starts empty; every hedge will fail until funded",
        );
    }

    for (symbol, price) in &config.price_feed.static_prices {
        if *price <= 0.0 {
            report.add_error(ValidationError::NonPositivePrice {
                symbol: symbol.clone(),
                price: *price,
            });
        }
    }
    if !config
        .price_feed
        .static_prices
        .contains_key(&config.vault.underlying_symbol)
    {
        report.add_error(ValidationError::MissingUnderlyingPrice(
            config.vault.underlying_symbol.clone(),
        ));
    }
    if config.price_feed.max_price_age_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "price_feed.max_price_age_seconds".to_string(),
        });
    }

    if config.reactors.is_empty() {
        report.add_error(ValidationError::NoReactors);
    }
    let mut seen_kinds = Vec::new();
    for (index, reactor) in config.reactors.iter().enumerate() {
        if !(1..=10_000).contains(&reactor.health_factor_bps) {
            report.add_error(ValidationError::InvalidBpsRange {
                field: format!("reactors[{index}].health_factor_bps"),
                value: reactor.health_factor_bps,
            });
        }
        if reactor.min_amount < 0.0 {
            report.add_error(ValidationError::InvalidReactor {
                index,
                kind: reactor.kind.to_string(),
                message: "min_amount must not be negative".to_string(),
            });
        }
        if reactor.kind == ReactorKind::Gmx && reactor.execution_delay_seconds == 0 {
            report.add_error(ValidationError::InvalidReactor {
                index,
                kind: reactor.kind.to_string(),
                message: "execution_delay_seconds must be positive".to_string(),
            });
        }
        if seen_kinds.contains(&reactor.kind) {
            // duplicates work, the pool routes by index
            report.add_warning(
                &format!("reactors[{index}]"),
                &format!("a {} reactor is already configured", reactor.kind),
            );
        }
        seen_kinds.push(reactor.kind);
    }

    if config.keeper.enabled && config.keeper.interval_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "keeper.interval_seconds".to_string(),
        });
    }
    if !config.keeper.enabled {
        report.add_warning(
            "keeper.enabled",
            "keeper disabled; async orders will never execute",
        );
    }

    report
}
