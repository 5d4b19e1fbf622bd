//! The reactor call/response contract

use crate::error::ReactorError;
use crate::venue::OrderKey;
use async_trait::async_trait;
use common::{AccountId, Usdc, Wad};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared reactor handle, held by both the pool and the keeper loop
pub type SharedReactor = Arc<Mutex<dyn HedgingReactor>>;

impl std::fmt::Debug for dyn HedgingReactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn HedgingReactor")
    }
}

/// Read-only collateralization report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultHealth {
    pub is_below_min: bool,
    pub is_above_max: bool,
    /// Signed deviation of the actual collateral ratio from the target,
    /// in basis points
    pub health: i128,
    /// Collateral that would bring the ratio back to target
    pub collat_to_transfer: Usdc,
}

impl VaultHealth {
    pub fn flat() -> Self {
        Self {
            is_below_min: false,
            is_above_max: false,
            health: 0,
            collat_to_transfer: 0,
        }
    }
}

/// Lifecycle events recorded by reactors, drained by the keeper loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactorEvent {
    /// An asynchronous order was enqueued on the venue
    OrderCreated {
        key: OrderKey,
        delta_change: Wad,
        collateral_delta: Usdc,
    },
    /// An asynchronous order was executed; `delta_change` is zero for
    /// pure collateral rebalances
    PositionExecuted { delta_change: Wad },
}

/// A pluggable adapter between the liquidity pool and one hedging venue
#[async_trait]
pub trait HedgingReactor: Send + Sync {
    /// Delta currently held by this reactor, e18
    fn delta(&self) -> Wad;

    /// Move the reactor's position by `-delta`. Pool-only. Returns the
    /// realized delta change; asynchronous venues enqueue an order and
    /// return 0, finalizing via keeper execution.
    async fn hedge_delta(&mut self, caller: AccountId, delta: Wad) -> Result<Wad, ReactorError>;

    /// Send up to `amount` (e18 collateral value) back to the pool,
    /// liquidating position as needed. Clamps instead of failing when
    /// the request exceeds the reactor's value. Pool-only.
    async fn withdraw(&mut self, caller: AccountId, amount: Wad) -> Result<Wad, ReactorError>;

    /// Rebalance venue collateral to the configured target at the
    /// current price without changing net delta. Keeper or pool.
    /// Returns signed collateral moved, positive when pulled from the
    /// pool.
    async fn update(&mut self, caller: AccountId) -> Result<Usdc, ReactorError>;

    /// Reconcile the tracked delta with the venue's reported position.
    /// Keeper or pool.
    async fn sync(&mut self, caller: AccountId) -> Result<(), ReactorError>;

    /// `sync` followed by `update`
    async fn sync_and_update(&mut self, caller: AccountId) -> Result<Usdc, ReactorError> {
        self.sync(caller).await?;
        self.update(caller).await
    }

    /// Venue collateral plus unrealized PnL in pool-collateral terms, e18
    fn pool_denominated_value(&self) -> Result<Wad, ReactorError>;

    /// Collateralization report for the current position
    fn check_vault_health(&self) -> Result<VaultHealth, ReactorError>;

    /// True while an asynchronous order awaits keeper execution
    fn has_pending_callback(&self) -> bool;

    /// Drain recorded lifecycle events
    fn drain_events(&mut self) -> Vec<ReactorEvent>;
}
