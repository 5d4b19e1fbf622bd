//! Pool funding handle
//!
//! Each reactor holds one of these instead of touching the pool's
//! balance directly. Pulls are checked against the pool's liquid
//! balance and its liquidity buffer; pushes return collateral to the
//! pool unconditionally.

use crate::error::ReactorError;
use common::{bps_of, AccountId, SharedLedger, Usdc};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PoolFunds {
    ledger: SharedLedger,
    pool_account: AccountId,
    buffer_bps: i128,
}

impl PoolFunds {
    pub fn new(ledger: SharedLedger, pool_account: AccountId, buffer_bps: i128) -> Self {
        Self {
            ledger,
            pool_account,
            buffer_bps,
        }
    }

    pub fn pool_account(&self) -> AccountId {
        self.pool_account
    }

    /// Liquid pool balance
    pub fn balance(&self) -> Usdc {
        self.ledger.balance_of(self.pool_account)
    }

    /// Transfer collateral from the pool to `to`, enforcing liquidity
    /// and buffer limits
    pub fn pull(&self, to: AccountId, amount: Usdc) -> Result<(), ReactorError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.ledger.balance_of(self.pool_account);
        if amount > balance {
            return Err(ReactorError::WithdrawExceedsLiquidity);
        }
        if balance - amount < bps_of(balance, self.buffer_bps) {
            return Err(ReactorError::MaxLiquidityBufferReached);
        }
        debug!(%to, amount, "pulling collateral from pool");
        self.ledger.transfer(self.pool_account, to, amount)?;
        Ok(())
    }

    /// Return collateral from `from` to the pool
    pub fn push(&self, from: AccountId, amount: Usdc) -> Result<(), ReactorError> {
        if amount == 0 {
            return Ok(());
        }
        debug!(%from, amount, "returning collateral to pool");
        self.ledger.transfer(from, self.pool_account, amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use common::USDC_SCALE;

    fn setup(buffer_bps: i128) -> (SharedLedger, AccountId, PoolFunds) {
        let ledger = SharedLedger::new();
        let pool = AccountId::new();
        ledger.credit(pool, 100_000 * USDC_SCALE).unwrap();
        let funds = PoolFunds::new(ledger.clone(), pool, buffer_bps);
        (ledger, pool, funds)
    }

    #[test]
    fn test_pull_within_buffer() {
        let (ledger, pool, funds) = setup(1_000);
        let reactor = AccountId::new();

        funds.pull(reactor, 50_000 * USDC_SCALE).unwrap();
        assert_eq!(ledger.balance_of(pool), 50_000 * USDC_SCALE);
        assert_eq!(ledger.balance_of(reactor), 50_000 * USDC_SCALE);
    }

    #[test]
    fn test_pull_exceeding_liquidity() {
        let (_ledger, _pool, funds) = setup(0);
        let reactor = AccountId::new();

        assert_matches!(
            funds.pull(reactor, 100_001 * USDC_SCALE),
            Err(ReactorError::WithdrawExceedsLiquidity)
        );
    }

    #[test]
    fn test_pull_breaching_buffer() {
        let (_ledger, _pool, funds) = setup(1_000);
        let reactor = AccountId::new();

        // 10% buffer of 100k leaves at most 90k pullable
        assert_matches!(
            funds.pull(reactor, 90_001 * USDC_SCALE),
            Err(ReactorError::MaxLiquidityBufferReached)
        );
        funds.pull(reactor, 90_000 * USDC_SCALE).unwrap();
    }

    #[test]
    fn test_push_returns_funds() {
        let (ledger, pool, funds) = setup(0);
        let reactor = AccountId::new();

        funds.pull(reactor, 10_000 * USDC_SCALE).unwrap();
        funds.push(reactor, 4_000 * USDC_SCALE).unwrap();

        assert_eq!(ledger.balance_of(pool), 94_000 * USDC_SCALE);
        assert_eq!(ledger.balance_of(reactor), 6_000 * USDC_SCALE);
    }
}
