//! Prometheus metrics infrastructure
//!
//! This module provides utilities for initializing Prometheus metrics
//! and creating hedge-specific metric sets for the keeper loop.

use metrics::{counter, gauge, Counter, Gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP server on the specified port that exposes metrics
/// at the `/metrics` endpoint.
///
/// # Arguments
///
/// * `port` - Port to expose metrics on
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9090)?;
/// // Metrics available at http://localhost:9090/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Per-reactor hedging metrics
///
/// Each reactor registered with the pool gets its own instance, labelled
/// by reactor kind. The keeper records into these on every tick.
///
/// # Metrics
///
/// * `dhv_hedges_requested_total` - Hedge orders submitted to the venue
/// * `dhv_hedges_executed_total` - Hedge orders confirmed filled
/// * `dhv_orders_pending` - Asynchronous orders awaiting execution
/// * `dhv_reactor_delta` - Current internal delta (whole units)
/// * `dhv_reactor_value_usdc` - Pool-denominated reactor value
/// * `dhv_pool_value_usdc` - Total pool net asset value
#[derive(Clone)]
pub struct HedgeMetrics {
    hedges_requested: Counter,
    hedges_executed: Counter,
    orders_pending: Gauge,
    reactor_delta: Gauge,
    reactor_value: Gauge,
    pool_value: Gauge,
    reactor_kind: String,
}

impl HedgeMetrics {
    /// Create metrics for a specific reactor
    ///
    /// # Arguments
    ///
    /// * `reactor_kind` - Kind of the reactor (e.g., "perp", "gmx", "spot")
    pub fn new(reactor_kind: &str) -> Self {
        let kind = reactor_kind.to_string();

        Self {
            hedges_requested: counter!("dhv_hedges_requested_total", "reactor" => kind.clone()),
            hedges_executed: counter!("dhv_hedges_executed_total", "reactor" => kind.clone()),
            orders_pending: gauge!("dhv_orders_pending", "reactor" => kind.clone()),
            reactor_delta: gauge!("dhv_reactor_delta", "reactor" => kind.clone()),
            reactor_value: gauge!("dhv_reactor_value_usdc", "reactor" => kind.clone()),
            pool_value: gauge!("dhv_pool_value_usdc"),
            reactor_kind: kind,
        }
    }

    /// Record a hedge order submitted to the venue
    pub fn hedge_requested(&self) {
        self.hedges_requested.increment(1);
    }

    /// Record a hedge order confirmed filled
    pub fn hedge_executed(&self) {
        self.hedges_executed.increment(1);
    }

    /// Update the count of asynchronous orders awaiting execution
    pub fn set_orders_pending(&self, count: u64) {
        self.orders_pending.set(count as f64);
    }

    /// Update the reactor's internal delta gauge (e18 fixed point in,
    /// whole units out)
    pub fn set_delta(&self, delta_e18: i128) {
        self.reactor_delta.set(delta_e18 as f64 / 1e18);
    }

    /// Update the reactor's pool-denominated value gauge (e6 fixed
    /// point in, whole collateral units out)
    pub fn set_reactor_value(&self, value_e6: i128) {
        self.reactor_value.set(value_e6 as f64 / 1e6);
    }

    /// Update the pool NAV gauge (e6 fixed point in, whole collateral
    /// units out)
    pub fn set_pool_value(&self, value_e6: i128) {
        self.pool_value.set(value_e6 as f64 / 1e6);
    }

    /// Get the reactor kind label
    pub fn reactor_kind(&self) -> &str {
        &self.reactor_kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hedge_metrics_creation() {
        // Just verify it doesn't panic
        let metrics = HedgeMetrics::new("perp");
        assert_eq!(metrics.reactor_kind(), "perp");

        metrics.hedge_requested();
        metrics.set_delta(-20 * 10i128.pow(18));
        metrics.set_pool_value(100_000 * 10i128.pow(6));
    }
}
