use std::collections::HashMap;

use crate::account::{Account, AccountId};

/// Possible errors to occur during ledger operations
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("The account does not hold enough funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("The credit would overflow the account balance")]
    BalanceOverflow,
}

/// The authoritative store of all account balances
///
/// Every movement of funds goes through the ledger. Multi-account operations
/// validate every affected account before touching any of them, so a failing
/// call never leaves a partial transfer behind.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: HashMap<AccountId, Account>,
}

impl Ledger {
    /// Creates a new, empty ledger
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// The map of all accounts that were ever credited
    pub fn accounts(&self) -> &HashMap<AccountId, Account> {
        &self.accounts
    }

    /// The account with the specified id, if it was ever credited
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// The total funds of an account, including held funds
    ///
    /// Returns `0` for accounts that were never credited.
    pub fn balance_of(&self, id: AccountId) -> u64 {
        self.accounts.get(&id).map_or(0, Account::total)
    }

    /// The funds of an account that are not held back
    pub fn available_of(&self, id: AccountId) -> u64 {
        self.accounts.get(&id).map_or(0, Account::available)
    }

    /// The funds of an account that are held back for pending transactions
    pub fn held_of(&self, id: AccountId) -> u64 {
        self.accounts.get(&id).map_or(0, Account::held)
    }

    /// Credits the available funds of an account
    pub fn deposit(&mut self, id: AccountId, amount: u64) -> Result<(), LedgerError> {
        self.entry(id).credit(amount)
    }

    /// Debits the available funds of an account
    pub fn withdraw(&mut self, id: AccountId, amount: u64) -> Result<(), LedgerError> {
        self.ensure_available(id, amount)?;
        self.entry(id).debit(amount)
    }

    /// Moves `amount` of available funds from one account to another
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: u64) -> Result<(), LedgerError> {
        self.ensure_available(from, amount)?;
        if from == to {
            return Ok(());
        }
        self.ensure_creditable(to, amount)?;

        self.entry(from).debit(amount)?;
        self.entry(to).credit(amount)
    }

    /// Holds back `amount` of an account's available funds
    pub(crate) fn hold(&mut self, id: AccountId, amount: u64) -> Result<(), LedgerError> {
        self.ensure_available(id, amount)?;
        self.entry(id).hold_back(amount)
    }

    /// Returns `amount` of held funds to the account's available funds
    pub(crate) fn release(&mut self, id: AccountId, amount: u64) -> Result<(), LedgerError> {
        self.ensure_held(id, amount)?;
        self.entry(id).set_free(amount)
    }

    /// Pays `amount` out of the held funds of `from` into the available funds of `to`
    pub(crate) fn settle_held(&mut self, from: AccountId, to: AccountId, amount: u64) -> Result<(), LedgerError> {
        self.ensure_held(from, amount)?;
        if from == to {
            return self.entry(from).set_free(amount);
        }
        self.ensure_creditable(to, amount)?;

        self.entry(from).pay_out_held(amount)?;
        self.entry(to).credit(amount)
    }

    fn entry(&mut self, id: AccountId) -> &mut Account {
        self.accounts
            .entry(id)
            .or_insert_with(|| Account::new(id))
    }

    fn ensure_available(&self, id: AccountId, amount: u64) -> Result<(), LedgerError> {
        match self.accounts.get(&id) {
            Some(account) => account.ensure_available(amount),
            None => Account::new(id).ensure_available(amount),
        }
    }

    fn ensure_held(&self, id: AccountId, amount: u64) -> Result<(), LedgerError> {
        match self.accounts.get(&id) {
            Some(account) => account.ensure_held(amount),
            None => Account::new(id).ensure_held(amount),
        }
    }

    fn ensure_creditable(&self, id: AccountId, amount: u64) -> Result<(), LedgerError> {
        match self.accounts.get(&id) {
            Some(account) => account.ensure_creditable(amount),
            None => Ok(()),
        }
    }
}
