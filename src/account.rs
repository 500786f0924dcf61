use std::fmt;

use crate::ledger::LedgerError;

/// The unique identifier of an account
///
/// Account ids are opaque principals. The same id space is used for senders,
/// recipients, the admin and anyone triggering an execution.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(u32);

impl From<u32> for AccountId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ledger account
///
/// The account consists of two sub balances:
/// 1. The available funds:
///    Available funds can be withdrawn, transferred, or
///    reserved for a conditional transaction.
/// 2. Held funds:
///    Funds reserved for pending conditional transactions when the
///    engine runs with [`ReservationPolicy::Escrow`](crate::ReservationPolicy::Escrow).
///    They still belong to the account, but cannot be spent until the
///    transaction is either executed or cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    available: u64,
    held: u64,
}

impl Account {
    /// Creates a new empty account with the specified id
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            available: 0,
            held: 0,
        }
    }

    /// The identifier of the account
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// The funds that can be spent right now
    pub fn available(&self) -> u64 {
        self.available
    }

    /// The funds reserved for pending conditional transactions
    pub fn held(&self) -> u64 {
        self.held
    }

    /// The total funds in the account
    ///
    /// The total funds are the sum of available and held funds.
    /// See [`Account`] for more info.
    pub fn total(&self) -> u64 {
        self.available + self.held
    }

    /// Checks that the available funds cover `amount`
    pub(crate) fn ensure_available(&self, amount: u64) -> Result<(), LedgerError> {
        match self.available >= amount {
            true => Ok(()),
            false => Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: self.available,
            }),
        }
    }

    /// Checks that crediting `amount` keeps the total representable
    pub(crate) fn ensure_creditable(&self, amount: u64) -> Result<(), LedgerError> {
        self.total()
            .checked_add(amount)
            .map(|_| ())
            .ok_or(LedgerError::BalanceOverflow)
    }

    /// Credits the specified amount to the available funds
    pub(crate) fn credit(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.ensure_creditable(amount)?;
        self.available += amount;

        Ok(())
    }

    /// Debits the specified amount from the available funds
    pub(crate) fn debit(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.ensure_available(amount)?;
        self.available -= amount;

        Ok(())
    }

    /// Moves the specified amount from available to held funds
    /// *To release the funds again, you can use [`Account::set_free`]*
    pub(crate) fn hold_back(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.ensure_available(amount)?;
        self.available -= amount;
        self.held += amount;

        Ok(())
    }

    /// Moves the specified amount from held back to available funds
    pub(crate) fn set_free(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.ensure_held(amount)?;
        self.held -= amount;
        self.available += amount;

        Ok(())
    }

    /// Removes the specified amount from the held funds without returning it
    pub(crate) fn pay_out_held(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.ensure_held(amount)?;
        self.held -= amount;

        Ok(())
    }

    pub(crate) fn ensure_held(&self, amount: u64) -> Result<(), LedgerError> {
        match self.held >= amount {
            true => Ok(()),
            false => Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: self.held,
            }),
        }
    }
}

impl serde::Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        use serde::ser::SerializeStruct;
        let mut map = serializer.serialize_struct("Account", 4)?;

        map.serialize_field("client", &self.id)?;
        map.serialize_field("available", &self.available)?;
        map.serialize_field("held", &self.held)?;
        map.serialize_field("total", &self.total())?;

        map.end()
    }
}
