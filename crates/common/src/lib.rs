//! Common types and utilities shared across the DHV protocol crates
//!
//! This crate provides the fixed-point unit conventions, account
//! identifiers, the in-process collateral token ledger, and the clock
//! abstraction used by the venue simulations.

pub mod clock;
pub mod ledger;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{LedgerError, SharedLedger, TokenLedger};
pub use types::{
    bps_of, usdc_to_wad, wad_div, wad_mul, wad_to_usdc, AccountId, Usdc, Wad, MAX_BPS, USDC_SCALE,
    WAD, WAD_TO_USDC,
};
