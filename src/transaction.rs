use std::fmt;

use crate::account::AccountId;

/// The unique identifier of a conditional transaction
///
/// Ids are handed out by the engine in creation order, starting at `0`.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    /// The id following this one
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for TransactionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conditional transaction waiting for its conditions
///
/// Funds are moved from the sender to the recipient once both the on-chain
/// and the off-chain condition are met and someone executes the transaction.
/// Sender, recipient and amount never change after creation; only the two
/// condition flags do.
#[derive(Clone, Debug, serde::Serialize, PartialEq, Eq)]
pub struct PendingTransaction {
    id: TransactionId,
    sender: AccountId,
    recipient: AccountId,
    amount: u64,
    on_chain_condition_met: bool,
    off_chain_condition_met: bool,
}

impl PendingTransaction {
    pub(crate) fn new(id: TransactionId, sender: AccountId, recipient: AccountId, amount: u64) -> Self {
        Self {
            id,
            sender,
            recipient,
            amount,
            on_chain_condition_met: false,
            off_chain_condition_met: false,
        }
    }

    /// The unique id of the transaction
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// The account funds are taken from
    pub fn sender(&self) -> AccountId {
        self.sender
    }

    /// The account funds are paid to
    pub fn recipient(&self) -> AccountId {
        self.recipient
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn on_chain_condition_met(&self) -> bool {
        self.on_chain_condition_met
    }

    pub fn off_chain_condition_met(&self) -> bool {
        self.off_chain_condition_met
    }

    /// Whether both conditions are met and the transaction may be executed
    pub fn is_executable(&self) -> bool {
        self.on_chain_condition_met && self.off_chain_condition_met
    }

    pub(crate) fn set_on_chain_condition(&mut self, met: bool) {
        self.on_chain_condition_met = met;
    }

    pub(crate) fn set_off_chain_condition(&mut self, met: bool) {
        self.off_chain_condition_met = met;
    }
}
