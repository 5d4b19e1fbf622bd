//! Synchronous perpetuals clearing house
//!
//! Margin is escrowed on the shared ledger; trades fill at the oracle
//! price with an optional taker fee charged from margin. Reducing or
//! flipping a position realizes PnL into margin immediately.

use crate::venue::VenueError;
use common::{
    bps_of, wad_div, wad_mul, wad_to_usdc, AccountId, SharedLedger, Usdc, Wad,
};
use parking_lot::Mutex;
use pricefeed::PriceFeed;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Fill report for one executed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeFill {
    pub price: Wad,
    pub fee: Usdc,
    pub realized_pnl: Usdc,
}

/// Margin trading venue with immediate settlement
pub trait ClearingHouse: Send + Sync {
    /// Move collateral from the trader's ledger account into margin
    fn deposit(&self, trader: AccountId, amount: Usdc) -> Result<(), VenueError>;

    /// Release margin back to the trader's ledger account
    fn withdraw(&self, trader: AccountId, amount: Usdc) -> Result<(), VenueError>;

    /// Fill `size_delta` at the oracle price, charging the taker fee
    fn execute_trade(&self, trader: AccountId, size_delta: Wad) -> Result<TradeFill, VenueError>;

    fn position(&self, trader: AccountId) -> Wad;

    fn margin(&self, trader: AccountId) -> Usdc;

    fn unrealized_pnl(&self, trader: AccountId) -> Result<Usdc, VenueError>;
}

#[derive(Debug, Default, Clone, Copy)]
struct MarginAccount {
    margin: Usdc,
    position: Wad,
    entry_price: Wad,
}

pub struct SimClearingHouse {
    ledger: SharedLedger,
    escrow: AccountId,
    feed: Arc<PriceFeed>,
    base: String,
    quote: String,
    taker_fee_bps: i128,
    accounts: Mutex<HashMap<AccountId, MarginAccount>>,
}

impl SimClearingHouse {
    pub fn new(
        ledger: SharedLedger,
        feed: Arc<PriceFeed>,
        base: &str,
        quote: &str,
        taker_fee_bps: i128,
    ) -> Self {
        Self {
            ledger,
            escrow: AccountId::new(),
            feed,
            base: base.to_string(),
            quote: quote.to_string(),
            taker_fee_bps,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    fn mark_price(&self) -> Result<Wad, VenueError> {
        Ok(self.feed.get_normalized_rate(&self.base, &self.quote)?)
    }

    fn pnl_at(account: &MarginAccount, price: Wad, size: Wad) -> Usdc {
        let direction = if account.position >= 0 { 1 } else { -1 };
        wad_to_usdc(wad_mul(price - account.entry_price, size)) * direction
    }
}

impl ClearingHouse for SimClearingHouse {
    fn deposit(&self, trader: AccountId, amount: Usdc) -> Result<(), VenueError> {
        self.ledger.transfer(trader, self.escrow, amount)?;
        self.accounts.lock().entry(trader).or_default().margin += amount;
        Ok(())
    }

    fn withdraw(&self, trader: AccountId, amount: Usdc) -> Result<(), VenueError> {
        {
            let mut accounts = self.accounts.lock();
            let account = accounts.entry(trader).or_default();
            if account.margin < amount {
                return Err(VenueError::InsufficientMargin);
            }
            account.margin -= amount;
        }
        self.ledger.transfer(self.escrow, trader, amount)?;
        Ok(())
    }

    fn execute_trade(&self, trader: AccountId, size_delta: Wad) -> Result<TradeFill, VenueError> {
        let price = self.mark_price()?;
        let mut accounts = self.accounts.lock();
        let account = accounts.entry(trader).or_default();

        let fee = bps_of(
            wad_to_usdc(wad_mul(size_delta.abs(), price)),
            self.taker_fee_bps,
        );
        if account.margin < fee {
            return Err(VenueError::InsufficientMargin);
        }
        account.margin -= fee;

        let old = account.position;
        let new = old + size_delta;
        let mut realized_pnl: Usdc = 0;

        if old == 0 || old.signum() == size_delta.signum() {
            // opening or adding: average the entry price
            let total = old.abs() + size_delta.abs();
            let notional =
                wad_mul(account.entry_price, old.abs()) + wad_mul(price, size_delta.abs());
            account.entry_price = wad_div(notional, total);
        } else if new == 0 || new.signum() == old.signum() {
            // reducing: realize on the closed size
            realized_pnl = Self::pnl_at(account, price, size_delta.abs());
            account.margin += realized_pnl;
        } else {
            // flip: realize on the full old size, remainder opens fresh
            realized_pnl = Self::pnl_at(account, price, old.abs());
            account.margin += realized_pnl;
            account.entry_price = price;
        }
        account.position = new;
        if new == 0 {
            account.entry_price = 0;
        }

        debug!(%trader, size_delta, price, fee, realized_pnl, "trade filled");
        Ok(TradeFill {
            price,
            fee,
            realized_pnl,
        })
    }

    fn position(&self, trader: AccountId) -> Wad {
        self.accounts
            .lock()
            .get(&trader)
            .map(|a| a.position)
            .unwrap_or(0)
    }

    fn margin(&self, trader: AccountId) -> Usdc {
        self.accounts
            .lock()
            .get(&trader)
            .map(|a| a.margin)
            .unwrap_or(0)
    }

    fn unrealized_pnl(&self, trader: AccountId) -> Result<Usdc, VenueError> {
        let accounts = self.accounts.lock();
        let Some(account) = accounts.get(&trader) else {
            return Ok(0);
        };
        if account.position == 0 {
            return Ok(0);
        }
        let price = self.feed.get_normalized_rate(&self.base, &self.quote)?;
        Ok(Self::pnl_at(account, price, account.position.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ManualClock, USDC_SCALE, WAD};
    use pricefeed::ManualAggregator;

    fn setup(price_8dec: i128) -> (SimClearingHouse, ManualAggregator, AccountId, SharedLedger) {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let feed = Arc::new(PriceFeed::new(clock.clone(), i64::MAX));
        let agg = ManualAggregator::new(clock, 8, price_8dec);
        feed.add_price_feed("ETH", "USD", Arc::new(agg.clone()));

        let ledger = SharedLedger::new();
        let trader = AccountId::new();
        ledger.credit(trader, 1_000_000 * USDC_SCALE).unwrap();

        let venue = SimClearingHouse::new(ledger.clone(), feed, "ETH", "USD", 0);
        (venue, agg, trader, ledger)
    }

    #[test]
    fn test_open_and_mark_to_market() {
        let (venue, agg, trader, _ledger) = setup(2_500_00000000);
        venue.deposit(trader, 50_000 * USDC_SCALE).unwrap();
        venue.execute_trade(trader, -20 * WAD).unwrap();

        assert_eq!(venue.position(trader), -20 * WAD);
        assert_eq!(venue.unrealized_pnl(trader).unwrap(), 0);

        // short 20, price drops $100: +2000 upnl
        agg.set_answer(2_400_00000000);
        assert_eq!(venue.unrealized_pnl(trader).unwrap(), 2_000 * USDC_SCALE);
    }

    #[test]
    fn test_reduce_realizes_pnl() {
        let (venue, agg, trader, _ledger) = setup(2_500_00000000);
        venue.deposit(trader, 50_000 * USDC_SCALE).unwrap();
        venue.execute_trade(trader, 10 * WAD).unwrap();

        agg.set_answer(2_600_00000000);
        let fill = venue.execute_trade(trader, -4 * WAD).unwrap();

        assert_eq!(fill.realized_pnl, 400 * USDC_SCALE);
        assert_eq!(venue.position(trader), 6 * WAD);
        assert_eq!(venue.margin(trader), 50_400 * USDC_SCALE);
    }

    #[test]
    fn test_flip_resets_entry() {
        let (venue, agg, trader, _ledger) = setup(2_000_00000000);
        venue.deposit(trader, 50_000 * USDC_SCALE).unwrap();
        venue.execute_trade(trader, 5 * WAD).unwrap();

        agg.set_answer(2_100_00000000);
        let fill = venue.execute_trade(trader, -8 * WAD).unwrap();

        // long 5 closed at +100 each
        assert_eq!(fill.realized_pnl, 500 * USDC_SCALE);
        assert_eq!(venue.position(trader), -3 * WAD);
        assert_eq!(venue.unrealized_pnl(trader).unwrap(), 0);
    }

    #[test]
    fn test_taker_fee_charged_from_margin() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let feed = Arc::new(PriceFeed::new(clock.clone(), i64::MAX));
        let agg = ManualAggregator::new(clock, 8, 2_000_00000000);
        feed.add_price_feed("ETH", "USD", Arc::new(agg));

        let ledger = SharedLedger::new();
        let trader = AccountId::new();
        ledger.credit(trader, 100_000 * USDC_SCALE).unwrap();

        // 10 bps taker fee
        let venue = SimClearingHouse::new(ledger, feed, "ETH", "USD", 10);
        venue.deposit(trader, 10_000 * USDC_SCALE).unwrap();
        let fill = venue.execute_trade(trader, WAD).unwrap();

        // 0.1% of $2000 notional
        assert_eq!(fill.fee, 2 * USDC_SCALE);
        assert_eq!(venue.margin(trader), 9_998 * USDC_SCALE);
    }
}
