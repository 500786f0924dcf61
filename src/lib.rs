pub use self::{
    account::{Account, AccountId},
    config::{EngineConfig, ParsePolicyError, ReservationPolicy},
    command::{Command, CommandType},
    engine::{EscrowEngine, EscrowError},
    event::Event,
    ledger::{Ledger, LedgerError},
    transaction::{PendingTransaction, TransactionId},
};

mod account;
mod command;
mod config;
mod engine;
mod event;
mod ledger;
pub mod service;
mod transaction;
