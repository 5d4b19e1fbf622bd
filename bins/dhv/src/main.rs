//! DHV CLI and keeper binary
//!
//! This is the main entry point for the delta-hedged vault. It provides
//! commands for initializing and validating configuration and for
//! running the vault with its keeper loop.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use common::{wad_to_usdc, AccountId, Clock, SharedLedger, SystemClock, Wad, USDC_SCALE, WAD};
use config::{
    generate_default_config, load_config, save_config, validate_config, DhvConfig, ReactorConfig,
    ReactorKind,
};
use observability::{init_logging, HedgeMetrics, LogFormat};
use pool::LiquidityPool;
use pricefeed::{Aggregator, ManualAggregator, PriceFeed};
use reactors::venue::{SimClearingHouse, SimPositionRouter, SimSwapRouter};
use reactors::{
    GmxHedgingReactor, PerpHedgingReactor, ReactorError, ReactorEvent, SharedReactor,
    SpotHedgingReactor,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Run {
            config,
            log_format,
            metrics_port,
        } => run_command(config, log_format, metrics_port).await,
        Commands::Validate { config } => {
            observability::logging::init_default_logging("dhv")?;
            validate_command(config).await
        }
        Commands::Init { output } => {
            observability::logging::init_default_logging("dhv")?;
            init_command(output).await
        }
    }
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Vault: {}", config.vault.name);
    println!(
        "Collateral: {} / Underlying: {}",
        config.vault.collateral_symbol, config.vault.underlying_symbol
    );
    println!("Reactors: {}", config.reactors.len());
    for (index, reactor) in config.reactors.iter().enumerate() {
        println!(
            "  [{}] {} (health factor {} bps)",
            index, reactor.kind, reactor.health_factor_bps
        );
    }

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!("  - Vault funding policy (buffer, initial deposit)");
    println!("  - A static ETH/USDC price feed");
    println!("  - 2 hedging reactors (perp, gmx)");
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize settings");
    println!(
        "  2. Run 'dhv validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'dhv run --config {:?}' to start the vault",
        output_path
    );

    Ok(())
}

async fn run_command<P: AsRef<Path>>(
    config_path: P,
    log_format_override: Option<String>,
    metrics_port_override: Option<u16>,
) -> Result<()> {
    let config = load_config(&config_path)?;

    let format = match log_format_override.as_deref() {
        Some(s) => s
            .parse::<LogFormat>()
            .map_err(|e| anyhow::anyhow!(e))?,
        None => config
            .logging
            .format
            .parse::<LogFormat>()
            .map_err(|e| anyhow::anyhow!(e))?,
    };
    init_logging("dhv", format)?;

    let report = validate_config(&config);
    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start vault due to configuration errors");
    }

    if config.monitoring.metrics_enabled {
        let port = metrics_port_override.unwrap_or(config.monitoring.metrics_port);
        observability::init_metrics(port)?;
    }

    let vault = build_vault(&config)?;
    info!(
        name = %config.vault.name,
        reactors = vault.handles.len(),
        liquid = vault.pool.liquid_balance(),
        "Vault started"
    );

    if !config.keeper.enabled {
        warn!("Keeper disabled; waiting for Ctrl-C");
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.keeper.interval_seconds));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                keeper_tick(&vault).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

/// One registered reactor plus the handles the keeper needs for it
struct ReactorHandle {
    index: usize,
    kind: ReactorKind,
    metrics: HedgeMetrics,
    /// Concrete handle for keeper-only order execution
    gmx: Option<Arc<Mutex<GmxHedgingReactor>>>,
}

struct Vault {
    pool: LiquidityPool,
    keeper: AccountId,
    handles: Vec<ReactorHandle>,
    /// Kept so the keeper can republish rounds, standing in for the
    /// oracle heartbeat
    aggregators: Vec<ManualAggregator>,
    pool_metrics: HedgeMetrics,
}

fn build_vault(config: &DhvConfig) -> Result<Vault> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ledger = SharedLedger::new();
    let keeper = AccountId::new();

    let mut feed = PriceFeed::new(clock.clone(), config.price_feed.max_price_age_seconds as i64);
    if let Some(grace) = config.price_feed.sequencer_grace_period_seconds {
        feed = feed.with_grace_period(grace as i64);
        // sequencer reported up since before the grace window, so
        // quotes flow from the first tick
        let uptime = ManualAggregator::new(clock.clone(), 0, 0);
        uptime.set_round(0, clock.now() - grace as i64 - 1, clock.now());
        feed.set_sequencer_uptime_feed(Arc::new(uptime));
    }
    let feed = Arc::new(feed);

    let mut aggregators = Vec::new();
    for (symbol, price) in &config.price_feed.static_prices {
        let scale = 10f64.powi(config.price_feed.decimals as i32);
        let answer = (price * scale).round() as i128;
        let agg = ManualAggregator::new(clock.clone(), config.price_feed.decimals, answer);
        feed.add_price_feed(symbol, &config.vault.collateral_symbol, Arc::new(agg.clone()));
        info!(symbol, price, answer, "price feed registered");
        aggregators.push(agg);
    }

    let mut pool = LiquidityPool::new(ledger.clone(), config.vault.buffer_bps as i128);
    pool.deposit(config.vault.initial_deposit as i128 * USDC_SCALE)
        .map_err(|e| anyhow::anyhow!(e))?;

    let base = &config.vault.underlying_symbol;
    let quote = &config.vault.collateral_symbol;
    let mut handles = Vec::new();
    for reactor_config in &config.reactors {
        let mut gmx = None;
        let shared: SharedReactor = match reactor_config.kind {
            ReactorKind::Perp => {
                let venue = Arc::new(SimClearingHouse::new(
                    ledger.clone(),
                    feed.clone(),
                    base,
                    quote,
                    reactor_config.fee_bps as i128,
                ));
                let mut reactor = PerpHedgingReactor::new(
                    pool.account(),
                    keeper,
                    pool.funds(),
                    venue,
                    feed.clone(),
                    base,
                    quote,
                    reactor_config.health_factor_bps as i128,
                );
                reactor
                    .set_min_amount(pool.account(), min_amount_wad(reactor_config))
                    .map_err(|e: ReactorError| anyhow::anyhow!(e))?;
                Arc::new(Mutex::new(reactor))
            }
            ReactorKind::Gmx => {
                let router = Arc::new(SimPositionRouter::new(
                    ledger.clone(),
                    feed.clone(),
                    clock.clone(),
                    base,
                    quote,
                    reactor_config.execution_delay_seconds as i64,
                ));
                let mut reactor = GmxHedgingReactor::new(
                    pool.account(),
                    keeper,
                    pool.funds(),
                    ledger.clone(),
                    router,
                    feed.clone(),
                    base,
                    quote,
                    reactor_config.health_factor_bps as i128,
                );
                reactor
                    .set_min_amount(pool.account(), min_amount_wad(reactor_config))
                    .map_err(|e: ReactorError| anyhow::anyhow!(e))?;
                let reactor = Arc::new(Mutex::new(reactor));
                gmx = Some(reactor.clone());
                reactor
            }
            ReactorKind::Spot => {
                let router = Arc::new(SimSwapRouter::new(
                    ledger.clone(),
                    feed.clone(),
                    base,
                    quote,
                    reactor_config.fee_bps as i128,
                ));
                let mut reactor = SpotHedgingReactor::new(
                    pool.account(),
                    keeper,
                    pool.funds(),
                    ledger.clone(),
                    router,
                    feed.clone(),
                    base,
                    quote,
                );
                reactor
                    .set_min_amount(pool.account(), min_amount_wad(reactor_config))
                    .map_err(|e: ReactorError| anyhow::anyhow!(e))?;
                Arc::new(Mutex::new(reactor))
            }
        };
        let index = pool.set_hedging_reactor(shared);
        handles.push(ReactorHandle {
            index,
            kind: reactor_config.kind,
            metrics: HedgeMetrics::new(&reactor_config.kind.to_string()),
            gmx,
        });
    }

    Ok(Vault {
        pool,
        keeper,
        handles,
        aggregators,
        pool_metrics: HedgeMetrics::new("pool"),
    })
}

fn min_amount_wad(reactor_config: &ReactorConfig) -> Wad {
    (reactor_config.min_amount * WAD as f64) as Wad
}

async fn keeper_tick(vault: &Vault) {
    // oracle heartbeat: re-stamp each round so static prices never go
    // stale under the feed's age check
    for agg in &vault.aggregators {
        let answer = agg.latest_round_data().answer;
        agg.set_answer(answer);
    }

    for handle in &vault.handles {
        execute_pending_orders(vault, handle).await;
        sync_reactor(vault, handle).await;
        check_health(vault, handle).await;
        record_reactor_metrics(vault, handle).await;
    }

    match vault.pool.assets().await {
        Ok(nav) => {
            vault.pool_metrics.set_pool_value(wad_to_usdc(nav));
            debug!(nav, delta = vault.pool.external_delta().await, "tick complete");
        }
        Err(e) => warn!(%e, "failed to value pool"),
    }
}

/// Finalize any GMX order whose router delay has elapsed
async fn execute_pending_orders(vault: &Vault, handle: &ReactorHandle) {
    let Some(gmx) = &handle.gmx else {
        return;
    };
    let mut reactor = gmx.lock().await;
    let Some(key) = reactor.pending_order_key() else {
        return;
    };
    let is_increase = reactor.pending_is_increase().unwrap_or(true);
    let result = if is_increase {
        reactor.execute_increase_position(vault.keeper, key)
    } else {
        reactor.execute_decrease_position(vault.keeper, key)
    };
    match result {
        Ok(delta_change) => {
            handle.metrics.hedge_executed();
            info!(index = handle.index, %key, delta_change, "order executed");
        }
        Err(ReactorError::Venue(venue_err)) => {
            debug!(index = handle.index, %key, %venue_err, "order not executable yet");
        }
        Err(e) => warn!(index = handle.index, %key, %e, "order execution failed"),
    }
}

async fn sync_reactor(vault: &Vault, handle: &ReactorHandle) {
    match vault.pool.sync_reactor(vault.keeper, handle.index).await {
        Ok(moved) if moved != 0 => {
            info!(index = handle.index, moved, "collateral retargeted");
        }
        Ok(_) => {}
        Err(pool::PoolError::Reactor(ReactorError::GmxCallbackPending)) => {
            debug!(index = handle.index, "sync deferred, order in flight");
        }
        Err(e) => warn!(index = handle.index, %e, "reactor sync failed"),
    }
}

async fn check_health(vault: &Vault, handle: &ReactorHandle) {
    match vault.pool.check_reactor_health(handle.index).await {
        Ok(health) if health.is_below_min => {
            warn!(
                index = handle.index,
                kind = %handle.kind,
                health = health.health,
                collat_to_transfer = health.collat_to_transfer,
                "reactor undercollateralized"
            );
        }
        Ok(health) => {
            debug!(index = handle.index, health = health.health, "reactor healthy");
        }
        Err(e) => warn!(index = handle.index, %e, "health check failed"),
    }
}

async fn record_reactor_metrics(vault: &Vault, handle: &ReactorHandle) {
    let reactor_handle = match vault.pool.hedging_reactor(handle.index) {
        Ok(h) => h.clone(),
        Err(e) => {
            warn!(index = handle.index, %e, "reactor lookup failed");
            return;
        }
    };
    let mut reactor = reactor_handle.lock().await;
    handle.metrics.set_delta(reactor.delta());
    handle
        .metrics
        .set_orders_pending(u64::from(reactor.has_pending_callback()));
    match reactor.pool_denominated_value() {
        Ok(value) => handle.metrics.set_reactor_value(wad_to_usdc(value)),
        Err(e) => warn!(index = handle.index, %e, "reactor valuation failed"),
    }
    for event in reactor.drain_events() {
        match event {
            ReactorEvent::OrderCreated {
                key,
                delta_change,
                collateral_delta,
            } => {
                handle.metrics.hedge_requested();
                info!(
                    index = handle.index,
                    %key,
                    delta_change,
                    collateral_delta,
                    "order created"
                );
            }
            ReactorEvent::PositionExecuted { delta_change } => {
                info!(index = handle.index, delta_change, "position executed");
            }
        }
    }
}
