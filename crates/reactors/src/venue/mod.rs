//! Venue seams and in-process simulations
//!
//! Each reactor talks to its venue through a trait; the sims implement
//! the venue mechanics over the shared collateral ledger and the price
//! feed, so the full hedge lifecycle runs in-process.

pub mod clearing_house;
pub mod position_router;
pub mod swap_router;

pub use clearing_house::{ClearingHouse, SimClearingHouse, TradeFill};
pub use position_router::{
    LegInfo, OrderKey, PositionRouter, SimPositionRouter, DEFAULT_MIN_EXECUTION_DELAY_SECS,
};
pub use swap_router::{SimSwapRouter, SwapRouter};

use common::LedgerError;
use pricefeed::PriceFeedError;
use thiserror::Error;

/// Errors raised by venue implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenueError {
    /// No pending order under the given key
    #[error("unknown order key")]
    UnknownOrder,

    /// Keeper tried to execute an order before the router delay elapsed
    #[error("execution delay not elapsed: {remaining_secs}s remaining")]
    DelayNotElapsed { remaining_secs: i64 },

    /// Margin account cannot cover the requested withdrawal or fee
    #[error("insufficient margin")]
    InsufficientMargin,

    /// Swap venue holds less base asset than requested
    #[error("insufficient inventory")]
    InsufficientInventory,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Price(#[from] PriceFeedError),
}
