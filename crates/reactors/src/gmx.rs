//! Asynchronous GMX-style hedging reactor
//!
//! Hedges enqueue router orders instead of filling inline; a keeper
//! executes them once the router delay elapses, which is when
//! `internal_delta` moves and `PositionExecuted` is recorded. Only one
//! order may be in flight at a time. Direction flips are two-legged: a
//! full-size decrease, then an automatically enqueued remainder
//! increase.

use crate::error::ReactorError;
use crate::funding::PoolFunds;
use crate::reactor::{HedgingReactor, ReactorEvent, VaultHealth};
use crate::venue::{OrderKey, PositionRouter, VenueError};
use async_trait::async_trait;
use common::{
    bps_of, usdc_to_wad, wad_mul, wad_to_usdc, AccountId, SharedLedger, Usdc, Wad, MAX_BPS, WAD,
};
use pricefeed::PriceFeed;
use std::sync::Arc;
use tracing::{info, instrument};

/// Smallest hedge worth acting on, 0.01 delta
pub const DEFAULT_MIN_AMOUNT: Wad = WAD / 100;

#[derive(Debug, Clone, Copy)]
struct PendingHedge {
    key: OrderKey,
    is_increase: bool,
    /// Signed change applied to `internal_delta` on execution
    delta_change: Wad,
    /// Remaining delta change to hedge once a flip's close leg executes
    flip_remainder: Wad,
}

pub struct GmxHedgingReactor {
    vault: AccountId,
    keeper: AccountId,
    account: AccountId,
    funds: PoolFunds,
    ledger: SharedLedger,
    router: Arc<dyn PositionRouter>,
    feed: Arc<PriceFeed>,
    base: String,
    quote: String,
    internal_delta: Wad,
    health_factor_bps: i128,
    min_amount: Wad,
    pending: Option<PendingHedge>,
    events: Vec<ReactorEvent>,
}

impl GmxHedgingReactor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vault: AccountId,
        keeper: AccountId,
        funds: PoolFunds,
        ledger: SharedLedger,
        router: Arc<dyn PositionRouter>,
        feed: Arc<PriceFeed>,
        base: &str,
        quote: &str,
        health_factor_bps: i128,
    ) -> Self {
        Self {
            vault,
            keeper,
            account: AccountId::new(),
            funds,
            ledger,
            router,
            feed,
            base: base.to_string(),
            quote: quote.to_string(),
            internal_delta: 0,
            health_factor_bps,
            min_amount: DEFAULT_MIN_AMOUNT,
            pending: None,
            events: Vec::new(),
        }
    }

    pub fn pending_order_key(&self) -> Option<OrderKey> {
        self.pending.map(|p| p.key)
    }

    pub fn pending_is_increase(&self) -> Option<bool> {
        self.pending.map(|p| p.is_increase)
    }

    /// Governance knob for the smallest actionable hedge
    pub fn set_min_amount(&mut self, caller: AccountId, amount: Wad) -> Result<(), ReactorError> {
        self.require_vault(caller)?;
        if amount < 0 {
            return Err(ReactorError::InvalidAmount(amount));
        }
        self.min_amount = amount;
        Ok(())
    }

    fn require_vault(&self, caller: AccountId) -> Result<(), ReactorError> {
        if caller != self.vault {
            return Err(ReactorError::NotVault);
        }
        Ok(())
    }

    fn require_keeper(&self, caller: AccountId) -> Result<(), ReactorError> {
        if caller != self.keeper && caller != self.vault {
            return Err(ReactorError::NotKeeper);
        }
        Ok(())
    }

    fn price(&self) -> Result<Wad, ReactorError> {
        Ok(self.feed.get_normalized_rate(&self.base, &self.quote)?)
    }

    /// Collateral to escrow for an added position size
    fn collateral_for(&self, size_abs: Wad, price: Wad) -> Usdc {
        bps_of(
            wad_to_usdc(wad_mul(size_abs, price)),
            self.health_factor_bps,
        )
    }

    fn record_order(&mut self, key: OrderKey, delta_change: Wad, collateral_delta: Usdc) {
        self.events.push(ReactorEvent::OrderCreated {
            key,
            delta_change,
            collateral_delta,
        });
    }

    /// Enqueue an increase for a signed delta change, escrowing fresh
    /// collateral from the pool
    fn enqueue_increase(&mut self, change: Wad, flip_remainder: Wad) -> Result<(), ReactorError> {
        let price = self.price()?;
        let collateral = self.collateral_for(change.abs(), price);
        self.funds.pull(self.account, collateral)?;
        let is_long = (self.internal_delta + change) > 0;
        let key = self
            .router
            .create_increase_position(self.account, collateral, change.abs(), is_long)?;
        self.pending = Some(PendingHedge {
            key,
            is_increase: true,
            delta_change: change,
            flip_remainder,
        });
        self.record_order(key, change, collateral);
        Ok(())
    }

    fn enqueue_decrease(
        &mut self,
        change: Wad,
        flip_remainder: Wad,
    ) -> Result<(), ReactorError> {
        let is_long = self.internal_delta > 0;
        let leg = self.router.leg(self.account, is_long);
        let size = change.abs();
        let collateral_out = if size >= leg.size {
            leg.collateral
        } else {
            leg.collateral * size / leg.size
        };
        let key = self.router.create_decrease_position(
            self.account,
            collateral_out,
            size.min(leg.size),
            is_long,
            self.funds.pool_account(),
        )?;
        self.pending = Some(PendingHedge {
            key,
            is_increase: false,
            delta_change: change,
            flip_remainder,
        });
        self.record_order(key, change, -collateral_out);
        Ok(())
    }

    fn take_pending(&mut self, key: OrderKey, is_increase: bool) -> Result<PendingHedge, ReactorError> {
        match self.pending {
            Some(p) if p.key == key && p.is_increase == is_increase => Ok(p),
            _ => Err(ReactorError::InvalidGmxCallback),
        }
    }

    /// Keeper entry point: finalize a pending increase order
    pub fn execute_increase_position(
        &mut self,
        caller: AccountId,
        key: OrderKey,
    ) -> Result<Wad, ReactorError> {
        self.require_keeper(caller)?;
        let pending = self.take_pending(key, true)?;
        if let Err(err) = self.router.execute_increase_position(key) {
            // anything but a delay failure consumed the order; keeping
            // it pending would wedge the reactor
            if !matches!(err, VenueError::DelayNotElapsed { .. }) {
                self.pending = None;
            }
            return Err(map_execution_error(err));
        }

        self.internal_delta += pending.delta_change;
        self.pending = None;
        self.events.push(ReactorEvent::PositionExecuted {
            delta_change: pending.delta_change,
        });
        info!(delta_change = pending.delta_change, internal_delta = self.internal_delta, "increase executed");
        Ok(pending.delta_change)
    }

    /// Keeper entry point: finalize a pending decrease order. A flip's
    /// close leg immediately enqueues the remainder increase.
    pub fn execute_decrease_position(
        &mut self,
        caller: AccountId,
        key: OrderKey,
    ) -> Result<Wad, ReactorError> {
        self.require_keeper(caller)?;
        let pending = self.take_pending(key, false)?;
        if let Err(err) = self.router.execute_decrease_position(key) {
            if !matches!(err, VenueError::DelayNotElapsed { .. }) {
                self.pending = None;
            }
            return Err(map_execution_error(err));
        }

        self.internal_delta += pending.delta_change;
        self.pending = None;
        self.events.push(ReactorEvent::PositionExecuted {
            delta_change: pending.delta_change,
        });
        info!(delta_change = pending.delta_change, internal_delta = self.internal_delta, "decrease executed");

        if pending.flip_remainder != 0 {
            self.enqueue_increase(pending.flip_remainder, 0)?;
        }
        Ok(pending.delta_change)
    }
}

fn map_execution_error(err: VenueError) -> ReactorError {
    match err {
        VenueError::UnknownOrder => ReactorError::InvalidGmxCallback,
        other => ReactorError::Venue(other),
    }
}

#[async_trait]
impl HedgingReactor for GmxHedgingReactor {
    fn delta(&self) -> Wad {
        self.internal_delta
    }

    #[instrument(skip(self), fields(reactor = "gmx"))]
    async fn hedge_delta(&mut self, caller: AccountId, delta: Wad) -> Result<Wad, ReactorError> {
        self.require_vault(caller)?;
        if self.pending.is_some() {
            return Err(ReactorError::GmxCallbackPending);
        }
        if delta.abs() < self.min_amount {
            return Ok(0);
        }

        let change = -delta;
        let new = self.internal_delta + change;
        if self.internal_delta == 0 || new.signum() == self.internal_delta.signum() {
            if new.abs() > self.internal_delta.abs() {
                self.enqueue_increase(change, 0)?;
            } else {
                self.enqueue_decrease(change, 0)?;
            }
        } else if new == 0 {
            self.enqueue_decrease(change, 0)?;
        } else {
            // flip: close the whole current leg, hedge the remainder
            // once the close executes
            self.enqueue_decrease(-self.internal_delta, new)?;
        }
        // asynchronous: nothing realized yet
        Ok(0)
    }

    async fn withdraw(&mut self, caller: AccountId, amount: Wad) -> Result<Wad, ReactorError> {
        self.require_vault(caller)?;
        if amount <= 0 {
            return Err(ReactorError::InvalidAmount(amount));
        }
        // only loose balance leaves synchronously; venue positions are
        // unwound through hedges and keeper execution
        let liquid = self.ledger.balance_of(self.account);
        let send = wad_to_usdc(amount).min(liquid);
        self.funds.push(self.account, send)?;
        Ok(usdc_to_wad(send))
    }

    async fn update(&mut self, caller: AccountId) -> Result<Usdc, ReactorError> {
        self.require_keeper(caller)?;
        if self.pending.is_some() {
            return Err(ReactorError::GmxCallbackPending);
        }
        if self.internal_delta == 0 {
            return Ok(0);
        }
        let is_long = self.internal_delta > 0;
        let leg = self.router.leg(self.account, is_long);
        if leg.size == 0 {
            return Ok(0);
        }
        let pnl = self.router.unrealized_pnl(self.account, is_long)?;
        let entry_notional = wad_to_usdc(wad_mul(leg.size, leg.entry_price));
        let target = bps_of(entry_notional, self.health_factor_bps) - pnl;
        let diff = target - leg.collateral;

        if diff > 0 {
            self.funds.pull(self.account, diff)?;
            let key = self
                .router
                .create_increase_position(self.account, diff, 0, is_long)?;
            self.pending = Some(PendingHedge {
                key,
                is_increase: true,
                delta_change: 0,
                flip_remainder: 0,
            });
            self.record_order(key, 0, diff);
        } else if diff < 0 {
            let key = self.router.create_decrease_position(
                self.account,
                -diff,
                0,
                is_long,
                self.funds.pool_account(),
            )?;
            self.pending = Some(PendingHedge {
                key,
                is_increase: false,
                delta_change: 0,
                flip_remainder: 0,
            });
            self.record_order(key, 0, diff);
        }
        Ok(diff)
    }

    async fn sync(&mut self, caller: AccountId) -> Result<(), ReactorError> {
        self.require_keeper(caller)?;
        let long = self.router.leg(self.account, true);
        let short = self.router.leg(self.account, false);
        self.internal_delta = long.size - short.size;
        Ok(())
    }

    fn pool_denominated_value(&self) -> Result<Wad, ReactorError> {
        let long = self.router.leg(self.account, true);
        let short = self.router.leg(self.account, false);
        let value = long.collateral
            + short.collateral
            + self.router.pending_collateral(self.account)
            + self.ledger.balance_of(self.account)
            + self.router.unrealized_pnl(self.account, true)?
            + self.router.unrealized_pnl(self.account, false)?;
        Ok(usdc_to_wad(value))
    }

    fn check_vault_health(&self) -> Result<VaultHealth, ReactorError> {
        let is_long = self.internal_delta > 0;
        let leg = self.router.leg(self.account, is_long);
        if leg.size == 0 {
            return Ok(VaultHealth::flat());
        }
        let pnl = self.router.unrealized_pnl(self.account, is_long)?;
        let entry_notional = wad_to_usdc(wad_mul(leg.size, leg.entry_price));
        let equity = leg.collateral + pnl;
        let actual_bps = equity * MAX_BPS / entry_notional;
        let health = actual_bps - self.health_factor_bps;
        Ok(VaultHealth {
            is_below_min: health < 0,
            is_above_max: health > 0,
            health,
            collat_to_transfer: (bps_of(entry_notional, self.health_factor_bps) - equity).abs(),
        })
    }

    fn has_pending_callback(&self) -> bool {
        self.pending.is_some()
    }

    fn drain_events(&mut self) -> Vec<ReactorEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::{SimPositionRouter, DEFAULT_MIN_EXECUTION_DELAY_SECS};
    use assert_matches::assert_matches;
    use common::{ManualClock, USDC_SCALE};
    use pricefeed::ManualAggregator;

    struct Harness {
        reactor: GmxHedgingReactor,
        vault: AccountId,
        keeper: AccountId,
        pool_account: AccountId,
        ledger: SharedLedger,
        clock: Arc<ManualClock>,
        agg: ManualAggregator,
    }

    fn setup(price_8dec: i128, health_factor_bps: i128) -> Harness {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let feed = Arc::new(PriceFeed::new(clock.clone(), i64::MAX));
        let agg = ManualAggregator::new(clock.clone(), 8, price_8dec);
        feed.add_price_feed("ETH", "USD", Arc::new(agg.clone()));

        let ledger = SharedLedger::new();
        let vault = AccountId::new();
        let keeper = AccountId::new();
        let pool_account = AccountId::new();
        ledger.credit(pool_account, 100_000 * USDC_SCALE).unwrap();

        let funds = PoolFunds::new(ledger.clone(), pool_account, 0);
        let router = Arc::new(SimPositionRouter::new(
            ledger.clone(),
            feed.clone(),
            clock.clone(),
            "ETH",
            "USD",
            DEFAULT_MIN_EXECUTION_DELAY_SECS,
        ));
        let reactor = GmxHedgingReactor::new(
            vault,
            keeper,
            funds,
            ledger.clone(),
            router,
            feed,
            "ETH",
            "USD",
            health_factor_bps,
        );
        Harness {
            reactor,
            vault,
            keeper,
            pool_account,
            ledger,
            clock,
            agg,
        }
    }

    fn pending_key(h: &Harness) -> OrderKey {
        h.reactor.pending_order_key().expect("order pending")
    }

    #[tokio::test]
    async fn test_hedge_enqueues_then_keeper_executes() {
        let mut h = setup(2_000_00000000, 5_000);

        // async: the hedge itself realizes nothing
        let realized = h.reactor.hedge_delta(h.vault, 20 * WAD).await.unwrap();
        assert_eq!(realized, 0);
        assert_eq!(h.reactor.delta(), 0);
        assert!(h.reactor.has_pending_callback());

        // 2x leverage: 20 * 2000 / 2 escrowed up front
        assert_eq!(
            h.ledger.balance_of(h.pool_account),
            (100_000 - 20_000) * USDC_SCALE
        );
        // in-flight collateral counts toward value
        assert_eq!(
            h.reactor.pool_denominated_value().unwrap(),
            usdc_to_wad(20_000 * USDC_SCALE)
        );

        let key = pending_key(&h);
        let events = h.reactor.drain_events();
        assert_matches!(
            events[0],
            ReactorEvent::OrderCreated { delta_change, .. } if delta_change == -20 * WAD
        );

        // too early for the keeper
        assert_matches!(
            h.reactor.execute_increase_position(h.keeper, key),
            Err(ReactorError::Venue(VenueError::DelayNotElapsed { .. }))
        );

        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let change = h.reactor.execute_increase_position(h.keeper, key).unwrap();
        assert_eq!(change, -20 * WAD);
        assert_eq!(h.reactor.delta(), -20 * WAD);
        assert!(!h.reactor.has_pending_callback());
        assert_eq!(
            h.reactor.drain_events(),
            vec![ReactorEvent::PositionExecuted {
                delta_change: -20 * WAD
            }]
        );
    }

    #[tokio::test]
    async fn test_second_hedge_while_pending() {
        let mut h = setup(2_000_00000000, 5_000);
        h.reactor.hedge_delta(h.vault, 10 * WAD).await.unwrap();

        assert_matches!(
            h.reactor.hedge_delta(h.vault, 5 * WAD).await,
            Err(ReactorError::GmxCallbackPending)
        );
        assert_matches!(
            h.reactor.update(h.keeper).await,
            Err(ReactorError::GmxCallbackPending)
        );
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let mut h = setup(2_000_00000000, 5_000);
        h.reactor.hedge_delta(h.vault, 10 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);

        assert_matches!(
            h.reactor.execute_increase_position(h.keeper, OrderKey::new()),
            Err(ReactorError::InvalidGmxCallback)
        );
        // right key, wrong kind
        let key = pending_key(&h);
        assert_matches!(
            h.reactor.execute_decrease_position(h.keeper, key),
            Err(ReactorError::InvalidGmxCallback)
        );
        // the pending order survives a bad execution attempt
        assert!(h.reactor.has_pending_callback());
    }

    #[tokio::test]
    async fn test_execute_requires_keeper() {
        let mut h = setup(2_000_00000000, 5_000);
        h.reactor.hedge_delta(h.vault, 10 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);

        let key = pending_key(&h);
        assert_matches!(
            h.reactor.execute_increase_position(AccountId::new(), key),
            Err(ReactorError::NotKeeper)
        );
    }

    #[tokio::test]
    async fn test_flip_runs_two_legs() {
        let mut h = setup(2_000_00000000, 5_000);

        // open short 20
        h.reactor.hedge_delta(h.vault, 20 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        h.reactor.execute_increase_position(h.keeper, key).unwrap();
        assert_eq!(h.reactor.delta(), -20 * WAD);
        h.reactor.drain_events();

        // flip to long 10: close leg first
        h.reactor.hedge_delta(h.vault, -30 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        let change = h.reactor.execute_decrease_position(h.keeper, key).unwrap();
        assert_eq!(change, 20 * WAD);
        assert_eq!(h.reactor.delta(), 0);

        // the remainder increase was auto-enqueued
        assert!(h.reactor.has_pending_callback());
        assert_eq!(h.reactor.pending_is_increase(), Some(true));
        // close leg returned 20k, remainder escrowed 10k
        assert_eq!(
            h.ledger.balance_of(h.pool_account),
            (100_000 - 10_000) * USDC_SCALE
        );
        // transient state stays exact: only in-flight collateral
        assert_eq!(
            h.reactor.pool_denominated_value().unwrap(),
            usdc_to_wad(10_000 * USDC_SCALE)
        );

        let events = h.reactor.drain_events();
        assert_matches!(
            events[0],
            ReactorEvent::PositionExecuted { delta_change } if delta_change == 20 * WAD
        );
        assert_matches!(
            events[1],
            ReactorEvent::OrderCreated { delta_change, .. } if delta_change == 10 * WAD
        );

        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        let change = h.reactor.execute_increase_position(h.keeper, key).unwrap();
        assert_eq!(change, 10 * WAD);
        assert_eq!(h.reactor.delta(), 10 * WAD);
        assert_eq!(
            h.reactor.pool_denominated_value().unwrap(),
            usdc_to_wad(10_000 * USDC_SCALE)
        );
    }

    #[tokio::test]
    async fn test_update_pulls_losses_from_pool() {
        let mut h = setup(2_000_00000000, 5_000);
        h.reactor.hedge_delta(h.vault, 20 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        h.reactor.execute_increase_position(h.keeper, key).unwrap();

        // short 20 loses 2k when price rises $100
        h.agg.set_answer(2_100_00000000);
        let moved = h.reactor.update(h.keeper).await.unwrap();
        assert_eq!(moved, 2_000 * USDC_SCALE);

        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        let change = h.reactor.execute_increase_position(h.keeper, key).unwrap();
        // collateral-only rebalance
        assert_eq!(change, 0);
        assert_eq!(
            h.reactor.pool_denominated_value().unwrap(),
            usdc_to_wad(20_000 * USDC_SCALE)
        );
    }

    #[tokio::test]
    async fn test_close_with_loss_beyond_collateral() {
        let mut h = setup(2_000_00000000, 5_000);
        h.reactor.hedge_delta(h.vault, 20 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        h.reactor.execute_increase_position(h.keeper, key).unwrap();
        h.reactor.drain_events();

        // short 20 is down 22k against 20k collateral
        h.agg.set_answer(3_100_00000000);
        h.reactor.hedge_delta(h.vault, -20 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        let change = h.reactor.execute_decrease_position(h.keeper, key).unwrap();
        assert_eq!(change, 20 * WAD);

        // the leg is wiped out and nothing comes back to the pool
        assert_eq!(h.reactor.delta(), 0);
        assert!(!h.reactor.has_pending_callback());
        assert_eq!(h.reactor.pool_denominated_value().unwrap(), 0);
        assert_eq!(
            h.ledger.balance_of(h.pool_account),
            (100_000 - 20_000) * USDC_SCALE
        );

        // the reactor can take the next hedge
        h.reactor.hedge_delta(h.vault, 5 * WAD).await.unwrap();
        assert!(h.reactor.has_pending_callback());
    }

    #[tokio::test]
    async fn test_set_min_amount_owner_only() {
        let mut h = setup(2_000_00000000, 5_000);

        assert_matches!(
            h.reactor.set_min_amount(AccountId::new(), WAD),
            Err(ReactorError::NotVault)
        );
        h.reactor.set_min_amount(h.vault, WAD).unwrap();

        // below the threshold nothing is enqueued
        let realized = h.reactor.hedge_delta(h.vault, WAD / 2).await.unwrap();
        assert_eq!(realized, 0);
        assert!(!h.reactor.has_pending_callback());
        assert_eq!(h.ledger.balance_of(h.pool_account), 100_000 * USDC_SCALE);
    }

    #[tokio::test]
    async fn test_update_returns_profit_to_pool() {
        let mut h = setup(2_000_00000000, 5_000);
        h.reactor.hedge_delta(h.vault, 20 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        h.reactor.execute_increase_position(h.keeper, key).unwrap();

        // short 20 gains 2k when price drops $100
        h.agg.set_answer(1_900_00000000);
        let moved = h.reactor.update(h.keeper).await.unwrap();
        assert_eq!(moved, -2_000 * USDC_SCALE);

        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        h.reactor.execute_decrease_position(h.keeper, key).unwrap();
        assert_eq!(
            h.ledger.balance_of(h.pool_account),
            (100_000 - 20_000 + 2_000) * USDC_SCALE
        );
    }

    #[tokio::test]
    async fn test_withdraw_sends_only_loose_balance() {
        let mut h = setup(2_000_00000000, 5_000);
        h.reactor.hedge_delta(h.vault, 10 * WAD).await.unwrap();
        h.clock.advance(DEFAULT_MIN_EXECUTION_DELAY_SECS);
        let key = pending_key(&h);
        h.reactor.execute_increase_position(h.keeper, key).unwrap();

        // nothing is liquid on the reactor account itself
        let sent = h
            .reactor
            .withdraw(h.vault, usdc_to_wad(1_000 * USDC_SCALE))
            .await
            .unwrap();
        assert_eq!(sent, 0);
        // the venue position is untouched
        assert_eq!(h.reactor.delta(), -10 * WAD);
    }
}
