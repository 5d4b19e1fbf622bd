//! Synchronous spot hedging reactor
//!
//! Buys and sells the underlying asset itself, so it can only carry
//! positive delta: hedging negative book delta buys base with pool
//! funds, hedging positive delta sells held inventory and clamps at
//! zero. Unleveraged, so health checks are always flat.

use crate::error::ReactorError;
use crate::funding::PoolFunds;
use crate::reactor::{HedgingReactor, ReactorEvent, VaultHealth};
use crate::venue::SwapRouter;
use async_trait::async_trait;
use common::{
    usdc_to_wad, wad_div, wad_mul, wad_to_usdc, AccountId, SharedLedger, Usdc, Wad, WAD,
};
use pricefeed::PriceFeed;
use std::sync::Arc;
use tracing::{info, instrument};

/// Smallest hedge worth acting on, 0.01 delta
pub const DEFAULT_MIN_AMOUNT: Wad = WAD / 100;

pub struct SpotHedgingReactor {
    vault: AccountId,
    keeper: AccountId,
    account: AccountId,
    funds: PoolFunds,
    ledger: SharedLedger,
    router: Arc<dyn SwapRouter>,
    feed: Arc<PriceFeed>,
    base: String,
    quote: String,
    internal_delta: Wad,
    min_amount: Wad,
}

impl SpotHedgingReactor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vault: AccountId,
        keeper: AccountId,
        funds: PoolFunds,
        ledger: SharedLedger,
        router: Arc<dyn SwapRouter>,
        feed: Arc<PriceFeed>,
        base: &str,
        quote: &str,
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
}

#[async_trait]
impl HedgingReactor for SpotHedgingReactor {
    fn delta(&self) -> Wad {
        self.internal_delta
    }

    #[instrument(skip(self), fields(reactor = "spot"))]
    async fn hedge_delta(&mut self, caller: AccountId, delta: Wad) -> Result<Wad, ReactorError> {
        self.require_vault(caller)?;
        if delta.abs() < self.min_amount {
            return Ok(0);
        }
        // long-only: clamp the target inventory at zero
        let desired = (self.internal_delta - delta).max(0);
        let change = desired - self.internal_delta;
        if change == 0 {
            return Ok(0);
        }

        if change > 0 {
            let cost = self.router.quote_exact_output(change)?;
            self.funds.pull(self.account, cost)?;
            self.router.swap_exact_output(self.account, change)?;
        } else {
            let proceeds = self.router.swap_exact_input(self.account, -change)?;
            self.funds.push(self.account, proceeds)?;
        }
        self.internal_delta = self.router.base_balance(self.account);
        info!(delta, change, internal_delta = self.internal_delta, "hedged");
        Ok(change)
    }

    async fn withdraw(&mut self, caller: AccountId, amount: Wad) -> Result<Wad, ReactorError> {
        self.require_vault(caller)?;
        if amount <= 0 {
            return Err(ReactorError::InvalidAmount(amount));
        }
        let desired = wad_to_usdc(amount);
        let liquid = self.ledger.balance_of(self.account);

        if desired > liquid {
            // sell inventory to cover the shortfall
            let held = self.router.base_balance(self.account);
            if held > 0 {
                let price = self.price()?;
                let shortfall = desired - liquid;
                let base_needed = wad_div(usdc_to_wad(shortfall), price).min(held);
                self.router.swap_exact_input(self.account, base_needed)?;
                self.internal_delta = self.router.base_balance(self.account);
            }
        }

        let send = desired.min(self.ledger.balance_of(self.account));
        self.funds.push(self.account, send)?;
        Ok(usdc_to_wad(send))
    }

    async fn update(&mut self, caller: AccountId) -> Result<Usdc, ReactorError> {
        // unleveraged: there is no collateral target to maintain
        self.require_keeper(caller)?;
        Ok(0)
    }

    async fn sync(&mut self, caller: AccountId) -> Result<(), ReactorError> {
        self.require_keeper(caller)?;
        self.internal_delta = self.router.base_balance(self.account);
        Ok(())
    }

    fn pool_denominated_value(&self) -> Result<Wad, ReactorError> {
        let held = self.router.base_balance(self.account);
        let inventory_value = if held > 0 {
            wad_mul(held, self.price()?)
        } else {
            0
        };
        Ok(usdc_to_wad(self.ledger.balance_of(self.account)) + inventory_value)
    }

    fn check_vault_health(&self) -> Result<VaultHealth, ReactorError> {
        Ok(VaultHealth::flat())
    }

    fn has_pending_callback(&self) -> bool {
        false
    }

    fn drain_events(&mut self) -> Vec<ReactorEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::SimSwapRouter;
    use assert_matches::assert_matches;
    use common::{ManualClock, USDC_SCALE};
    use pricefeed::ManualAggregator;

    struct Harness {
        reactor: SpotHedgingReactor,
        vault: AccountId,
        pool_account: AccountId,
        ledger: SharedLedger,
    }

    fn setup(price_8dec: i128) -> Harness {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let feed = Arc::new(PriceFeed::new(clock.clone(), i64::MAX));
        let agg = ManualAggregator::new(clock, 8, price_8dec);
        feed.add_price_feed("ETH", "USD", Arc::new(agg));

        let ledger = SharedLedger::new();
        let vault = AccountId::new();
        let keeper = AccountId::new();
        let pool_account = AccountId::new();
        ledger.credit(pool_account, 100_000 * USDC_SCALE).unwrap();

        let funds = PoolFunds::new(ledger.clone(), pool_account, 0);
        let router = Arc::new(SimSwapRouter::new(ledger.clone(), feed.clone(), "ETH", "USD", 0));
        let reactor = SpotHedgingReactor::new(
            vault,
            keeper,
            funds,
            ledger.clone(),
            router,
            feed,
            "ETH",
            "USD",
        );
        Harness {
            reactor,
            vault,
            pool_account,
            ledger,
        }
    }

    #[tokio::test]
    async fn test_negative_delta_buys_base() {
        let mut h = setup(2_000_00000000);

        let change = h.reactor.hedge_delta(h.vault, -5 * WAD).await.unwrap();

        assert_eq!(change, 5 * WAD);
        assert_eq!(h.reactor.delta(), 5 * WAD);
        assert_eq!(
            h.ledger.balance_of(h.pool_account),
            (100_000 - 10_000) * USDC_SCALE
        );
        assert_eq!(
            h.reactor.pool_denominated_value().unwrap(),
            usdc_to_wad(10_000 * USDC_SCALE)
        );
    }

    #[tokio::test]
    async fn test_positive_delta_without_inventory_is_noop() {
        let mut h = setup(2_000_00000000);

        let change = h.reactor.hedge_delta(h.vault, 5 * WAD).await.unwrap();

        assert_eq!(change, 0);
        assert_eq!(h.reactor.delta(), 0);
        assert_eq!(h.ledger.balance_of(h.pool_account), 100_000 * USDC_SCALE);
    }

    #[tokio::test]
    async fn test_positive_delta_clamps_to_inventory() {
        let mut h = setup(2_000_00000000);
        h.reactor.hedge_delta(h.vault, -3 * WAD).await.unwrap();

        // asked to shed 5 delta but only 3 are held
        let change = h.reactor.hedge_delta(h.vault, 5 * WAD).await.unwrap();

        assert_eq!(change, -3 * WAD);
        assert_eq!(h.reactor.delta(), 0);
        // sale proceeds went straight back to the pool
        assert_eq!(h.ledger.balance_of(h.pool_account), 100_000 * USDC_SCALE);
    }

    #[tokio::test]
    async fn test_withdraw_sells_inventory() {
        let mut h = setup(2_000_00000000);
        h.reactor.hedge_delta(h.vault, -5 * WAD).await.unwrap();

        let sent = h
            .reactor
            .withdraw(h.vault, usdc_to_wad(4_000 * USDC_SCALE))
            .await
            .unwrap();

        assert_eq!(sent, usdc_to_wad(4_000 * USDC_SCALE));
        assert_eq!(h.reactor.delta(), 3 * WAD);
        assert_eq!(
            h.reactor.pool_denominated_value().unwrap(),
            usdc_to_wad(6_000 * USDC_SCALE)
        );
    }

    #[tokio::test]
    async fn test_withdraw_clamps_at_total_value() {
        let mut h = setup(2_000_00000000);
        h.reactor.hedge_delta(h.vault, -5 * WAD).await.unwrap();

        let sent = h
            .reactor
            .withdraw(h.vault, usdc_to_wad(50_000 * USDC_SCALE))
            .await
            .unwrap();

        assert_eq!(sent, usdc_to_wad(10_000 * USDC_SCALE));
        assert_eq!(h.reactor.delta(), 0);
        assert_eq!(h.reactor.pool_denominated_value().unwrap(), 0);
        assert_eq!(h.ledger.balance_of(h.pool_account), 100_000 * USDC_SCALE);
    }

    #[tokio::test]
    async fn test_health_always_flat() {
        let mut h = setup(2_000_00000000);
        h.reactor.hedge_delta(h.vault, -5 * WAD).await.unwrap();

        assert_eq!(h.reactor.check_vault_health().unwrap(), VaultHealth::flat());
    }

    #[tokio::test]
    async fn test_set_min_amount_owner_only() {
        let mut h = setup(2_000_00000000);

        assert_matches!(
            h.reactor.set_min_amount(AccountId::new(), WAD),
            Err(ReactorError::NotVault)
        );
        h.reactor.set_min_amount(h.vault, WAD).unwrap();

        // below the threshold nothing trades
        let change = h.reactor.hedge_delta(h.vault, -WAD / 2).await.unwrap();
        assert_eq!(change, 0);
        assert_eq!(h.reactor.delta(), 0);
        assert_eq!(h.ledger.balance_of(h.pool_account), 100_000 * USDC_SCALE);
    }

    #[tokio::test]
    async fn test_non_vault_rejected() {
        let mut h = setup(2_000_00000000);
        assert_matches!(
            h.reactor.hedge_delta(AccountId::new(), WAD).await,
            Err(ReactorError::NotVault)
        );
    }
}
