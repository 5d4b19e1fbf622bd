//! The options liquidity pool
//!
//! Owns the collateral account and the ordered list of hedging
//! reactors, routes hedges to them, and enforces the funding policy
//! through the handle each reactor gets at construction.

pub mod error;
pub mod pool;

pub use error::PoolError;
pub use pool::LiquidityPool;
