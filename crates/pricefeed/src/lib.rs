//! Oracle price feed registry
//!
//! Maps asset pairs to price aggregators and exposes raw and
//! wad-normalized rates. On layer-2 deployments every read first
//! consults the sequencer uptime feed and rejects prices while the
//! sequencer is down or still inside its grace period after restart.

pub mod aggregator;
pub mod error;
pub mod feed;

pub use aggregator::{Aggregator, ManualAggregator, RoundData};
pub use error::PriceFeedError;
pub use feed::{PriceFeed, SEQUENCER_GRACE_PERIOD_SECS};
