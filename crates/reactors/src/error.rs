use crate::venue::VenueError;
use common::{LedgerError, Wad};
use pricefeed::PriceFeedError;
use thiserror::Error;

/// Errors raised by hedging reactors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReactorError {
    /// Caller is not the owning liquidity pool
    #[error("caller is not the vault")]
    NotVault,

    /// Caller is neither a keeper nor the owning pool
    #[error("caller is not a keeper")]
    NotKeeper,

    /// Amount is malformed (zero where nonzero is required, wrong sign)
    #[error("invalid amount: {0}")]
    InvalidAmount(Wad),

    /// Requested collateral exceeds the pool's liquid balance
    #[error("withdraw exceeds pool liquidity")]
    WithdrawExceedsLiquidity,

    /// Funding the hedge would leave the pool below its liquidity buffer
    #[error("max liquidity buffer reached")]
    MaxLiquidityBufferReached,

    /// A previously enqueued order has not been executed yet
    #[error("gmx callback pending")]
    GmxCallbackPending,

    /// Execution key does not match the pending order
    #[error("invalid gmx callback")]
    InvalidGmxCallback,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Price(#[from] PriceFeedError),

    #[error(transparent)]
    Venue(#[from] VenueError),
}
