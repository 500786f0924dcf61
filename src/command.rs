use crate::{account::AccountId, transaction::TransactionId};

/// The different commands a script can issue against the engine
#[derive(Clone, Copy, Debug, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    /// Credits `amount` to the `caller`'s account
    Deposit,
    /// Debits `amount` from the `caller`'s available funds
    Withdraw,
    /// Creates a conditional transaction from `caller` to `counterparty`
    Create,
    /// Sets the on-chain condition of `tx` to `met`
    OnChain,
    /// Sets the off-chain condition of `tx` to `met`
    OffChain,
    /// Executes `tx` on behalf of `caller`
    Execute,
    /// Cancels `tx` on behalf of `caller`
    Cancel,
    /// Hands the admin role over to `counterparty`
    Admin,
}

/// A single line of a command script
///
/// Only the fields relevant for the command type have to be populated.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    command_type: CommandType,
    caller: AccountId,
    tx: Option<TransactionId>,
    counterparty: Option<AccountId>,
    amount: Option<u64>,
    met: Option<bool>,
}

impl Command {
    pub fn new(command_type: CommandType, caller: AccountId) -> Self {
        Self {
            command_type,
            caller,
            tx: None,
            counterparty: None,
            amount: None,
            met: None,
        }
    }

    pub fn with_tx(mut self, tx: TransactionId) -> Self {
        self.tx = Some(tx);
        self
    }

    pub fn with_counterparty(mut self, counterparty: AccountId) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_met(mut self, met: bool) -> Self {
        self.met = Some(met);
        self
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    /// The account issuing the command
    pub fn caller(&self) -> AccountId {
        self.caller
    }

    /// The referenced transaction
    /// Will only be populated for condition updates, executions and cancellations
    pub fn tx(&self) -> Option<TransactionId> {
        self.tx
    }

    /// The recipient of a new transaction, or the new admin
    pub fn counterparty(&self) -> Option<AccountId> {
        self.counterparty
    }

    pub fn amount(&self) -> Option<u64> {
        self.amount
    }

    pub fn met(&self) -> Option<bool> {
        self.met
    }
}
