//! Asynchronous GMX-style position router
//!
//! Orders escrow their collateral at creation and fill only when a
//! keeper executes them after the router's minimum delay. Long and
//! short legs are tracked separately per account.

use crate::venue::VenueError;
use common::{wad_div, wad_mul, wad_to_usdc, AccountId, Clock, SharedLedger, Usdc, Wad};
use parking_lot::Mutex;
use pricefeed::PriceFeed;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Default keeper execution delay, matching GMX mainnet
pub const DEFAULT_MIN_EXECUTION_DELAY_SECS: i64 = 180;

/// Identifier of one enqueued order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderKey(Uuid);

impl OrderKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of an account's position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegInfo {
    pub size: Wad,
    pub collateral: Usdc,
    pub entry_price: Wad,
}

/// Fill report for one executed order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedOrder {
    pub account: AccountId,
    pub is_increase: bool,
    pub is_long: bool,
    pub size_delta: Wad,
    pub collateral_delta: Usdc,
    pub price: Wad,
    pub realized_pnl: Usdc,
}

/// Keeper-executed position venue
pub trait PositionRouter: Send + Sync {
    /// Enqueue a position increase, escrowing `collateral_in` from the
    /// account's ledger balance
    fn create_increase_position(
        &self,
        account: AccountId,
        collateral_in: Usdc,
        size_delta: Wad,
        is_long: bool,
    ) -> Result<OrderKey, VenueError>;

    /// Enqueue a position decrease; on execution `collateral_out` plus
    /// realized profit is sent to `receiver`
    fn create_decrease_position(
        &self,
        account: AccountId,
        collateral_out: Usdc,
        size_delta: Wad,
        is_long: bool,
        receiver: AccountId,
    ) -> Result<OrderKey, VenueError>;

    fn execute_increase_position(&self, key: OrderKey) -> Result<ExecutedOrder, VenueError>;

    fn execute_decrease_position(&self, key: OrderKey) -> Result<ExecutedOrder, VenueError>;

    fn leg(&self, account: AccountId, is_long: bool) -> LegInfo;

    /// Collateral escrowed by this account's still-pending orders
    fn pending_collateral(&self, account: AccountId) -> Usdc;

    fn unrealized_pnl(&self, account: AccountId, is_long: bool) -> Result<Usdc, VenueError>;

    fn min_execution_delay(&self) -> i64;
}

#[derive(Debug, Clone, Copy)]
struct PendingOrder {
    account: AccountId,
    is_increase: bool,
    is_long: bool,
    collateral: Usdc,
    size_delta: Wad,
    receiver: AccountId,
    created_at: i64,
}

pub struct SimPositionRouter {
    ledger: SharedLedger,
    escrow: AccountId,
    feed: Arc<PriceFeed>,
    clock: Arc<dyn Clock>,
    base: String,
    quote: String,
    delay_secs: i64,
    pending: Mutex<HashMap<OrderKey, PendingOrder>>,
    legs: Mutex<HashMap<(AccountId, bool), LegInfo>>,
}

impl SimPositionRouter {
    pub fn new(
        ledger: SharedLedger,
        feed: Arc<PriceFeed>,
        clock: Arc<dyn Clock>,
        base: &str,
        quote: &str,
        delay_secs: i64,
    ) -> Self {
        Self {
            ledger,
            escrow: AccountId::new(),
            feed,
            clock,
            base: base.to_string(),
            quote: quote.to_string(),
            delay_secs,
            pending: Mutex::new(HashMap::new()),
            legs: Mutex::new(HashMap::new()),
        }
    }

    fn mark_price(&self) -> Result<Wad, VenueError> {
        Ok(self.feed.get_normalized_rate(&self.base, &self.quote)?)
    }

    fn take_executable(&self, key: OrderKey, is_increase: bool) -> Result<PendingOrder, VenueError> {
        let mut pending = self.pending.lock();
        let order = pending.get(&key).copied().ok_or(VenueError::UnknownOrder)?;
        if order.is_increase != is_increase {
            return Err(VenueError::UnknownOrder);
        }
        let elapsed = self.clock.now() - order.created_at;
        if elapsed < self.delay_secs {
            return Err(VenueError::DelayNotElapsed {
                remaining_secs: self.delay_secs - elapsed,
            });
        }
        pending.remove(&key);
        Ok(order)
    }

    fn leg_pnl(leg: &LegInfo, price: Wad, size: Wad, is_long: bool) -> Usdc {
        let direction = if is_long { 1 } else { -1 };
        wad_to_usdc(wad_mul(price - leg.entry_price, size)) * direction
    }
}

impl PositionRouter for SimPositionRouter {
    fn create_increase_position(
        &self,
        account: AccountId,
        collateral_in: Usdc,
        size_delta: Wad,
        is_long: bool,
    ) -> Result<OrderKey, VenueError> {
        if collateral_in > 0 {
            self.ledger.transfer(account, self.escrow, collateral_in)?;
        }
        let key = OrderKey::new();
        self.pending.lock().insert(
            key,
            PendingOrder {
                account,
                is_increase: true,
                is_long,
                collateral: collateral_in,
                size_delta,
                receiver: account,
                created_at: self.clock.now(),
            },
        );
        debug!(%key, %account, collateral_in, size_delta, is_long, "increase order enqueued");
        Ok(key)
    }

    fn create_decrease_position(
        &self,
        account: AccountId,
        collateral_out: Usdc,
        size_delta: Wad,
        is_long: bool,
        receiver: AccountId,
    ) -> Result<OrderKey, VenueError> {
        let key = OrderKey::new();
        self.pending.lock().insert(
            key,
            PendingOrder {
                account,
                is_increase: false,
                is_long,
                collateral: collateral_out,
                size_delta,
                receiver,
                created_at: self.clock.now(),
            },
        );
        debug!(%key, %account, collateral_out, size_delta, is_long, "decrease order enqueued");
        Ok(key)
    }

    fn execute_increase_position(&self, key: OrderKey) -> Result<ExecutedOrder, VenueError> {
        let order = self.take_executable(key, true)?;
        let price = self.mark_price()?;

        let mut legs = self.legs.lock();
        let leg = legs.entry((order.account, order.is_long)).or_default();
        if order.size_delta > 0 {
            let total = leg.size + order.size_delta;
            let notional =
                wad_mul(leg.entry_price, leg.size) + wad_mul(price, order.size_delta);
            leg.entry_price = wad_div(notional, total);
            leg.size = total;
        }
        leg.collateral += order.collateral;

        debug!(%key, price, "increase order executed");
        Ok(ExecutedOrder {
            account: order.account,
            is_increase: true,
            is_long: order.is_long,
            size_delta: order.size_delta,
            collateral_delta: order.collateral,
            price,
            realized_pnl: 0,
        })
    }

    fn execute_decrease_position(&self, key: OrderKey) -> Result<ExecutedOrder, VenueError> {
        let order = self.take_executable(key, false)?;
        let price = self.mark_price()?;

        let mut legs = self.legs.lock();
        let leg = legs
            .get_mut(&(order.account, order.is_long))
            .ok_or(VenueError::UnknownOrder)?;
        if order.size_delta > leg.size {
            return Err(VenueError::InsufficientMargin);
        }

        let realized = Self::leg_pnl(leg, price, order.size_delta, order.is_long);
        let collateral_out = if order.size_delta == leg.size {
            // full close releases whatever collateral is left
            leg.collateral
        } else {
            order.collateral.min(leg.collateral)
        };
        leg.size -= order.size_delta;
        if leg.size == 0 {
            leg.entry_price = 0;
        }
        leg.collateral -= collateral_out;

        // profits are paid by the venue; losses come out of the payout,
        // and a loss beyond the released collateral zeroes it out, the
        // way a liquidation would
        let payout = (collateral_out + realized).max(0);
        if realized > 0 {
            self.ledger.credit(self.escrow, realized)?;
        } else {
            self.ledger.debit(self.escrow, collateral_out - payout)?;
        }
        self.ledger.transfer(self.escrow, order.receiver, payout)?;

        debug!(%key, price, realized, payout, "decrease order executed");
        Ok(ExecutedOrder {
            account: order.account,
            is_increase: false,
            is_long: order.is_long,
            size_delta: order.size_delta,
            collateral_delta: payout,
            price,
            realized_pnl: realized,
        })
    }

    fn leg(&self, account: AccountId, is_long: bool) -> LegInfo {
        self.legs
            .lock()
            .get(&(account, is_long))
            .copied()
            .unwrap_or_default()
    }

    fn pending_collateral(&self, account: AccountId) -> Usdc {
        self.pending
            .lock()
            .values()
            .filter(|o| o.account == account && o.is_increase)
            .map(|o| o.collateral)
            .sum()
    }

    fn unrealized_pnl(&self, account: AccountId, is_long: bool) -> Result<Usdc, VenueError> {
        let leg = self.leg(account, is_long);
        if leg.size == 0 {
            return Ok(0);
        }
        let price = self.mark_price()?;
        Ok(Self::leg_pnl(&leg, price, leg.size, is_long))
    }

    fn min_execution_delay(&self) -> i64 {
        self.delay_secs
    }
}
