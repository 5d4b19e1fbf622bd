//! In-process collateral token ledger
//!
//! Stands in for the collateral ERC-20: every party that can hold funds
//! (the liquidity pool, each reactor, each venue escrow) gets an account,
//! and all collateral movement goes through explicit transfers so that
//! balances can be asserted on exactly in tests.

use crate::types::{AccountId, Usdc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Account balance is lower than the requested amount
    #[error("insufficient balance: account {account} has {available}, requested {requested}")]
    InsufficientBalance {
        account: AccountId,
        available: Usdc,
        requested: Usdc,
    },

    /// Amount must be non-negative
    #[error("invalid amount: {0}")]
    InvalidAmount(Usdc),
}

/// Single-token balance ledger
#[derive(Debug, Default)]
pub struct TokenLedger {
    balances: HashMap<AccountId, Usdc>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an account, zero if never funded
    pub fn balance_of(&self, account: AccountId) -> Usdc {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Credit an account (minting, used for initial funding)
    pub fn credit(&mut self, account: AccountId, amount: Usdc) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        *self.balances.entry(account).or_insert(0) += amount;
        Ok(())
    }

    /// Debit an account, failing if the balance is insufficient
    pub fn debit(&mut self, account: AccountId, amount: Usdc) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let balance = self.balances.entry(account).or_insert(0);
        if *balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account,
                available: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    /// Move funds between two accounts
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Usdc,
    ) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }
}

/// Cloneable shared handle over the ledger
#[derive(Debug, Clone, Default)]
pub struct SharedLedger(Arc<Mutex<TokenLedger>>);

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: AccountId) -> Usdc {
        self.0.lock().balance_of(account)
    }

    pub fn credit(&self, account: AccountId, amount: Usdc) -> Result<(), LedgerError> {
        self.0.lock().credit(account, amount)
    }

    pub fn debit(&self, account: AccountId, amount: Usdc) -> Result<(), LedgerError> {
        self.0.lock().debit(account, amount)
    }

    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Usdc,
    ) -> Result<(), LedgerError> {
        self.0.lock().transfer(from, to, amount)
    }
}
