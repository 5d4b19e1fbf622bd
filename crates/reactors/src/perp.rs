//! Synchronous perpetuals hedging reactor
//!
//! Hedges through a margin clearing house: each hedge retargets venue
//! collateral to `|position| * price * health_factor` and fills the
//! size change at the oracle price in the same call.

use crate::error::ReactorError;
use crate::funding::PoolFunds;
use crate::reactor::{HedgingReactor, ReactorEvent, VaultHealth};
use crate::venue::ClearingHouse;
use async_trait::async_trait;
use common::{
    bps_of, usdc_to_wad, wad_div, wad_mul, wad_to_usdc, AccountId, Usdc, Wad, MAX_BPS, WAD,
};
use pricefeed::PriceFeed;
use std::sync::Arc;
use tracing::{info, instrument};

/// Smallest hedge worth acting on, 0.01 delta
pub const DEFAULT_MIN_AMOUNT: Wad = WAD / 100;

pub struct PerpHedgingReactor {
    vault: AccountId,
    keeper: AccountId,
    account: AccountId,
    funds: PoolFunds,
    venue: Arc<dyn ClearingHouse>,
    feed: Arc<PriceFeed>,
    base: String,
    quote: String,
    internal_delta: Wad,
    health_factor_bps: i128,
    min_amount: Wad,
}

impl PerpHedgingReactor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vault: AccountId,
        keeper: AccountId,
        funds: PoolFunds,
        venue: Arc<dyn ClearingHouse>,
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
            venue,
            feed,
            base: base.to_string(),
            quote: quote.to_string(),
            internal_delta: 0,
            health_factor_bps,
            min_amount: DEFAULT_MIN_AMOUNT,
        }
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

    /// Margin target for a position of the given absolute size
    fn collateral_required(&self, position_abs: Wad, price: Wad) -> Usdc {
        wad_to_usdc(bps_of(wad_mul(position_abs, price), self.health_factor_bps))
    }

    /// Pull or release margin until it matches `required`; returns the
    /// signed collateral moved, positive when pulled from the pool
    fn retarget_margin(&self, required: Usdc) -> Result<Usdc, ReactorError> {
        let margin = self.venue.margin(self.account);
        if required > margin {
            let shortfall = required - margin;
            self.funds.pull(self.account, shortfall)?;
            self.venue.deposit(self.account, shortfall)?;
            Ok(shortfall)
        } else if required < margin {
            let excess = margin - required;
            self.venue.withdraw(self.account, excess)?;
            self.funds.push(self.account, excess)?;
            Ok(-excess)
        } else {
            Ok(0)
        }
    }

    fn value_usdc(&self) -> Result<Usdc, ReactorError> {
        Ok(self.venue.margin(self.account) + self.venue.unrealized_pnl(self.account)?)
    }
}

#[async_trait]
impl HedgingReactor for PerpHedgingReactor {
    fn delta(&self) -> Wad {
        self.internal_delta
    }

    #[instrument(skip(self), fields(reactor = "perp"))]
    async fn hedge_delta(&mut self, caller: AccountId, delta: Wad) -> Result<Wad, ReactorError> {
        self.require_vault(caller)?;
        if delta.abs() < self.min_amount {
            return Ok(0);
        }
        let price = self.price()?;
        let new_position = self.internal_delta - delta;
        let required = self.collateral_required(new_position.abs(), price);

        // fund the post-trade margin target first so liquidity and
        // buffer failures surface before the fill
        if required > self.venue.margin(self.account) {
            let shortfall = required - self.venue.margin(self.account);
            self.funds.pull(self.account, shortfall)?;
            self.venue.deposit(self.account, shortfall)?;
        }
        self.venue.execute_trade(self.account, -delta)?;
        self.retarget_margin(required)?;

        self.internal_delta = self.venue.position(self.account);
        info!(delta, internal_delta = self.internal_delta, "hedged");
        Ok(-delta)
    }

    async fn withdraw(&mut self, caller: AccountId, amount: Wad) -> Result<Wad, ReactorError> {
        self.require_vault(caller)?;
        if amount <= 0 {
            return Err(ReactorError::InvalidAmount(amount));
        }
        let desired = wad_to_usdc(amount);
        let value = self.value_usdc()?;
        if value <= 0 {
            return Ok(0);
        }

        if desired >= value {
            // full exit: close the position, realize PnL, drain margin
            let position = self.venue.position(self.account);
            if position != 0 {
                self.venue.execute_trade(self.account, -position)?;
            }
            let margin = self.venue.margin(self.account);
            self.venue.withdraw(self.account, margin)?;
            self.funds.push(self.account, margin)?;
            self.internal_delta = 0;
            info!(sent = margin, "reactor fully drained");
            return Ok(usdc_to_wad(margin));
        }

        let price = self.price()?;
        let position = self.venue.position(self.account);
        let required = self.collateral_required(position.abs(), price);
        let free = self.venue.margin(self.account) - required;
        if desired > free {
            // close enough position to release the shortfall
            let shortfall = desired - free;
            let unit_collat = self.collateral_required(WAD, price);
            let close_size = wad_div(usdc_to_wad(shortfall), usdc_to_wad(unit_collat))
                .min(position.abs());
            self.venue
                .execute_trade(self.account, -position.signum() * close_size)?;
            let new_required =
                self.collateral_required(self.venue.position(self.account).abs(), price);
            let releasable = self.venue.margin(self.account) - new_required;
            let send = desired.min(releasable.max(0));
            self.venue.withdraw(self.account, send)?;
            self.funds.push(self.account, send)?;
            self.internal_delta = self.venue.position(self.account);
            return Ok(usdc_to_wad(send));
        }

        self.venue.withdraw(self.account, desired)?;
        self.funds.push(self.account, desired)?;
        Ok(usdc_to_wad(desired))
    }

    async fn update(&mut self, caller: AccountId) -> Result<Usdc, ReactorError> {
        self.require_keeper(caller)?;
        let price = self.price()?;
        let position = self.venue.position(self.account);
        let required = self.collateral_required(position.abs(), price);
        self.retarget_margin(required)
    }

    async fn sync(&mut self, caller: AccountId) -> Result<(), ReactorError> {
        self.require_keeper(caller)?;
        self.internal_delta = self.venue.position(self.account);
        Ok(())
    }

    fn pool_denominated_value(&self) -> Result<Wad, ReactorError> {
        Ok(usdc_to_wad(self.value_usdc()?))
    }

    fn check_vault_health(&self) -> Result<VaultHealth, ReactorError> {
        let position = self.venue.position(self.account);
        if position == 0 {
            return Ok(VaultHealth::flat());
        }
        let price = self.price()?;
        let notional = wad_to_usdc(wad_mul(position.abs(), price));
        let equity = self.value_usdc()?;
        let actual_bps = equity * MAX_BPS / notional;
        let health = actual_bps - self.health_factor_bps;
        let target = bps_of(notional, self.health_factor_bps);
        Ok(VaultHealth {
            is_below_min: health < 0,
            is_above_max: health > 0,
            health,
            collat_to_transfer: (target - equity).abs(),
        })
    }

    fn has_pending_callback(&self) -> bool {
        false
    }

    fn drain_events(&mut self) -> Vec<ReactorEvent> {
        Vec::new()
    }
}
