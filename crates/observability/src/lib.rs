//! Observability infrastructure for the hedging vault
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics
//! - Hedge-specific metric helpers for the keeper loop
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! // Initialize logging
//! init_logging("dhv", LogFormat::Pretty)?;
//!
//! // Initialize metrics (optional)
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, HedgeMetrics};
