//! Reactor registry and hedge routing

use crate::error::PoolError;
use common::{usdc_to_wad, wad_to_usdc, AccountId, SharedLedger, Usdc, Wad};
use reactors::{PoolFunds, SharedReactor, VaultHealth};
use tracing::{info, warn};

pub struct LiquidityPool {
    account: AccountId,
    ledger: SharedLedger,
    buffer_bps: i128,
    reactors: Vec<SharedReactor>,
}

impl LiquidityPool {
    pub fn new(ledger: SharedLedger, buffer_bps: i128) -> Self {
        Self {
            account: AccountId::new(),
            ledger,
            buffer_bps,
            reactors: Vec::new(),
        }
    }

    /// The pool's collateral account, also its caller identity toward
    /// reactors
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Funding handle to hand to a reactor at construction
    pub fn funds(&self) -> PoolFunds {
        PoolFunds::new(self.ledger.clone(), self.account, self.buffer_bps)
    }

    /// Seed the pool with collateral
    pub fn deposit(&self, amount: Usdc) -> Result<(), PoolError> {
        self.ledger.credit(self.account, amount)?;
        Ok(())
    }

    /// Liquid collateral not deployed to any reactor
    pub fn liquid_balance(&self) -> Usdc {
        self.ledger.balance_of(self.account)
    }

    /// Append a reactor; indices of existing reactors never change
    pub fn set_hedging_reactor(&mut self, reactor: SharedReactor) -> usize {
        self.reactors.push(reactor);
        let index = self.reactors.len() - 1;
        info!(index, "hedging reactor registered");
        index
    }

    pub fn reactor_count(&self) -> usize {
        self.reactors.len()
    }

    pub fn hedging_reactor(&self, index: usize) -> Result<&SharedReactor, PoolError> {
        self.reactors
            .get(index)
            .ok_or(PoolError::ReactorIndexOutOfBounds {
                index,
                count: self.reactors.len(),
            })
    }

    /// Drain a reactor and drop it from the list. Fails while the
    /// reactor still has an unsettled async order, or while a withdraw
    /// cannot recover value still held on the venue.
    pub async fn remove_hedging_reactor(&mut self, index: usize) -> Result<Wad, PoolError> {
        let handle = self.hedging_reactor(index)?.clone();
        let recovered = {
            let mut reactor = handle.lock().await;
            if reactor.has_pending_callback() {
                warn!(index, "removal blocked by pending callback");
                return Err(PoolError::CallbackPending);
            }
            let recovered = reactor.withdraw(self.account, Wad::MAX).await?;
            let remaining = reactor.pool_denominated_value()?;
            if wad_to_usdc(remaining) > 0 {
                warn!(index, remaining, "removal blocked by unrecovered venue value");
                return Err(PoolError::ReactorValueOutstanding { remaining });
            }
            recovered
        };
        self.reactors.remove(index);
        info!(index, recovered, "hedging reactor removed");
        Ok(recovered)
    }

    /// Route a hedge of `delta` to the reactor at `index`
    pub async fn rebalance_portfolio_delta(
        &self,
        delta: Wad,
        index: usize,
    ) -> Result<Wad, PoolError> {
        let handle = self.hedging_reactor(index)?.clone();
        let mut reactor = handle.lock().await;
        let realized = reactor.hedge_delta(self.account, delta).await?;
        info!(delta, realized, index, "portfolio delta rebalanced");
        Ok(realized)
    }

    /// Forward a keeper collateral-rebalance call, preserving the
    /// caller identity
    pub async fn update_reactor(&self, caller: AccountId, index: usize) -> Result<Usdc, PoolError> {
        let handle = self.hedging_reactor(index)?.clone();
        let mut reactor = handle.lock().await;
        Ok(reactor.update(caller).await?)
    }

    /// Forward a keeper sync-and-rebalance call
    pub async fn sync_reactor(&self, caller: AccountId, index: usize) -> Result<Usdc, PoolError> {
        let handle = self.hedging_reactor(index)?.clone();
        let mut reactor = handle.lock().await;
        Ok(reactor.sync_and_update(caller).await?)
    }

    pub async fn check_reactor_health(&self, index: usize) -> Result<VaultHealth, PoolError> {
        let handle = self.hedging_reactor(index)?.clone();
        let reactor = handle.lock().await;
        Ok(reactor.check_vault_health()?)
    }

    /// Net delta held across all reactors
    pub async fn external_delta(&self) -> Wad {
        let mut total = 0;
        for handle in &self.reactors {
            total += handle.lock().await.delta();
        }
        total
    }

    /// Pool NAV: liquid collateral plus each reactor's value, e18
    pub async fn assets(&self) -> Result<Wad, PoolError> {
        let mut total = usdc_to_wad(self.liquid_balance());
        for handle in &self.reactors {
            total += handle.lock().await.pool_denominated_value()?;
        }
        Ok(total)
    }
}
