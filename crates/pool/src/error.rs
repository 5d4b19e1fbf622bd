use common::{LedgerError, Wad};
use pricefeed::PriceFeedError;
use reactors::ReactorError;
use thiserror::Error;

/// Errors raised by pool operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Reactor index outside the registered list
    #[error("reactor index {index} out of bounds, {count} registered")]
    ReactorIndexOutOfBounds { index: usize, count: usize },

    /// Reactor cannot be removed while an async order is unsettled
    #[error("reactor has a pending callback")]
    CallbackPending,

    /// Reactor withdraw could not recover value still held on the venue
    #[error("reactor still holds venue value: {remaining}")]
    ReactorValueOutstanding { remaining: Wad },

    #[error(transparent)]
    Reactor(#[from] ReactorError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PoolError {
    /// User-facing rendering of the failure; anything without a
    /// specific message falls back to a generic support prompt
    pub fn user_message(&self) -> &'static str {
        match self {
            PoolError::Reactor(ReactorError::WithdrawExceedsLiquidity) => {
                "Withdrawal amount exceeds available liquidity."
            }
            PoolError::Reactor(ReactorError::MaxLiquidityBufferReached) => {
                "The liquidity buffer has been reached. Try a smaller amount."
            }
            PoolError::Reactor(ReactorError::GmxCallbackPending) | PoolError::CallbackPending => {
                "A hedge order is still settling. Please try again shortly."
            }
            PoolError::ReactorValueOutstanding { .. } => {
                "The reactor still holds funds on its venue. Unwind the position first."
            }
            PoolError::Reactor(ReactorError::InvalidGmxCallback) => {
                "The hedge order could not be matched. Please try again."
            }
            PoolError::Reactor(ReactorError::InvalidAmount(_)) => "Invalid amount.",
            PoolError::Reactor(ReactorError::Price(PriceFeedError::SequencerDown)) => {
                "The network sequencer is down. Please try again later."
            }
            PoolError::Reactor(ReactorError::Price(PriceFeedError::GracePeriodNotOver)) => {
                "The network just restarted. Please try again in a few minutes."
            }
            PoolError::Reactor(ReactorError::Price(_)) => {
                "Price data is unavailable. Please try again later."
            }
            _ => "Something went wrong. Please contact support.",
        }
    }
}
