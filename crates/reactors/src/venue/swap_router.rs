//! Synchronous spot swap venue
//!
//! An infinite-liquidity AMM counterparty: swaps settle immediately at
//! the oracle price plus a pool fee. Base-asset inventory bought through
//! the router is tracked per account.

use crate::venue::VenueError;
use common::{bps_of, wad_mul, wad_to_usdc, AccountId, SharedLedger, Usdc, Wad};
use parking_lot::Mutex;
use pricefeed::PriceFeed;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub trait SwapRouter: Send + Sync {
    /// Collateral needed to buy `base_out`, fee included
    fn quote_exact_output(&self, base_out: Wad) -> Result<Usdc, VenueError>;

    /// Buy exactly `base_out` base asset with the payer's collateral;
    /// returns the collateral spent
    fn swap_exact_output(&self, payer: AccountId, base_out: Wad) -> Result<Usdc, VenueError>;

    /// Sell exactly `base_in` of the payer's base inventory; returns the
    /// collateral received
    fn swap_exact_input(&self, payer: AccountId, base_in: Wad) -> Result<Usdc, VenueError>;

    /// Base-asset inventory held through this router
    fn base_balance(&self, account: AccountId) -> Wad;
}

pub struct SimSwapRouter {
    ledger: SharedLedger,
    feed: Arc<PriceFeed>,
    base: String,
    quote: String,
    fee_bps: i128,
    balances: Mutex<HashMap<AccountId, Wad>>,
}

impl SimSwapRouter {
    pub fn new(
        ledger: SharedLedger,
        feed: Arc<PriceFeed>,
        base: &str,
        quote: &str,
        fee_bps: i128,
    ) -> Self {
        Self {
            ledger,
            feed,
            base: base.to_string(),
            quote: quote.to_string(),
            fee_bps,
            balances: Mutex::new(HashMap::new()),
        }
    }

    fn mark_price(&self) -> Result<Wad, VenueError> {
        Ok(self.feed.get_normalized_rate(&self.base, &self.quote)?)
    }
}

impl SwapRouter for SimSwapRouter {
    fn quote_exact_output(&self, base_out: Wad) -> Result<Usdc, VenueError> {
        let price = self.mark_price()?;
        let cost = wad_to_usdc(wad_mul(base_out, price));
        Ok(cost + bps_of(cost, self.fee_bps))
    }

    fn swap_exact_output(&self, payer: AccountId, base_out: Wad) -> Result<Usdc, VenueError> {
        let total = self.quote_exact_output(base_out)?;
        self.ledger.debit(payer, total)?;
        *self.balances.lock().entry(payer).or_insert(0) += base_out;
        debug!(%payer, base_out, total, "bought base");
        Ok(total)
    }

    fn swap_exact_input(&self, payer: AccountId, base_in: Wad) -> Result<Usdc, VenueError> {
        {
            let mut balances = self.balances.lock();
            let held = balances.entry(payer).or_insert(0);
            if *held < base_in {
                return Err(VenueError::InsufficientInventory);
            }
            *held -= base_in;
        }
        let price = self.mark_price()?;
        let gross = wad_to_usdc(wad_mul(base_in, price));
        let proceeds = gross - bps_of(gross, self.fee_bps);
        self.ledger.credit(payer, proceeds)?;
        debug!(%payer, base_in, proceeds, "sold base");
        Ok(proceeds)
    }

    fn base_balance(&self, account: AccountId) -> Wad {
        self.balances.lock().get(&account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use common::{ManualClock, USDC_SCALE, WAD};
    use pricefeed::ManualAggregator;

    fn setup(fee_bps: i128) -> (SimSwapRouter, AccountId, SharedLedger) {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let feed = Arc::new(PriceFeed::new(clock.clone(), i64::MAX));
        let agg = ManualAggregator::new(clock, 8, 2_000_00000000);
        feed.add_price_feed("ETH", "USD", Arc::new(agg));

        let ledger = SharedLedger::new();
        let trader = AccountId::new();
        ledger.credit(trader, 100_000 * USDC_SCALE).unwrap();

        let router = SimSwapRouter::new(ledger.clone(), feed, "ETH", "USD", fee_bps);
        (router, trader, ledger)
    }

    #[test]
    fn test_buy_then_sell_round_trip() {
        let (router, trader, ledger) = setup(0);

        let spent = router.swap_exact_output(trader, 5 * WAD).unwrap();
        assert_eq!(spent, 10_000 * USDC_SCALE);
        assert_eq!(router.base_balance(trader), 5 * WAD);

        let received = router.swap_exact_input(trader, 5 * WAD).unwrap();
        assert_eq!(received, 10_000 * USDC_SCALE);
        assert_eq!(router.base_balance(trader), 0);
        assert_eq!(ledger.balance_of(trader), 100_000 * USDC_SCALE);
    }

    #[test]
    fn test_fee_applied_both_ways() {
        // 30 bps pool fee
        let (router, trader, _ledger) = setup(30);

        let spent = router.swap_exact_output(trader, WAD).unwrap();
        assert_eq!(spent, 2_006 * USDC_SCALE);

        let received = router.swap_exact_input(trader, WAD).unwrap();
        assert_eq!(received, 1_994 * USDC_SCALE);
    }

    #[test]
    fn test_sell_without_inventory() {
        let (router, trader, _ledger) = setup(0);
        assert_matches!(
            router.swap_exact_input(trader, WAD),
            Err(VenueError::InsufficientInventory)
        );
    }
}
