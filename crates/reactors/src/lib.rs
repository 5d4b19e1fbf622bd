//! Hedging reactor protocol
//!
//! A hedging reactor adapts one external venue to the liquidity pool's
//! hedging interface: the pool asks a reactor to absorb a signed delta,
//! the reactor opens or adjusts a position on its venue, funded from the
//! pool's collateral through a buffer-enforcing funding handle. Venues
//! may settle synchronously (perpetuals clearing house, spot swaps) or
//! asynchronously through keeper-executed orders (GMX-style router).

pub mod error;
pub mod funding;
pub mod gmx;
pub mod perp;
pub mod reactor;
pub mod spot;
pub mod venue;

pub use error::ReactorError;
pub use funding::PoolFunds;
pub use gmx::GmxHedgingReactor;
pub use perp::PerpHedgingReactor;
pub use reactor::{HedgingReactor, ReactorEvent, SharedReactor, VaultHealth};
pub use spot::SpotHedgingReactor;
