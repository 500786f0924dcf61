use crate::{account::AccountId, transaction::TransactionId};

/// A state transition recorded by the engine
///
/// Executed and cancelled transactions both disappear from the registry, so
/// the event log is the only place the two outcomes can be told apart.
#[derive(Clone, Debug, serde::Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    TransactionCreated {
        id: TransactionId,
        sender: AccountId,
        recipient: AccountId,
        amount: u64,
    },
    OnChainConditionSet {
        id: TransactionId,
        met: bool,
    },
    OffChainConditionSet {
        id: TransactionId,
        met: bool,
    },
    /// Funds were moved from the sender to the recipient
    TransactionExecuted {
        id: TransactionId,
        executor: AccountId,
    },
    /// The sender withdrew the transaction, no funds were moved
    TransactionCancelled {
        id: TransactionId,
    },
    AdminChanged {
        previous: AccountId,
        admin: AccountId,
    },
}
