use std::fmt;
use std::str::FromStr;

use crate::account::AccountId;

/// How funds of a conditional transaction are secured between creation and execution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReservationPolicy {
    /// Nothing is locked. The sender's balance is checked on creation and
    /// checked again by the ledger transfer on execution, so an execution
    /// can fail late if the sender spent the funds in the meantime.
    #[default]
    Recheck,
    /// The amount is held back from the sender's available funds on creation,
    /// released on cancellation and paid out on execution.
    Escrow,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown reservation policy `{0}`, expected `recheck` or `escrow`")]
pub struct ParsePolicyError(String);

impl FromStr for ReservationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recheck" => Ok(Self::Recheck),
            "escrow" => Ok(Self::Escrow),
            _ => Err(ParsePolicyError(s.to_owned())),
        }
    }
}

impl fmt::Display for ReservationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recheck => f.write_str("recheck"),
            Self::Escrow => f.write_str("escrow"),
        }
    }
}

/// The settings an [`EscrowEngine`](crate::EscrowEngine) is deployed with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// The initial admin, usually the deploying identity
    pub admin: AccountId,
    pub reservation: ReservationPolicy,
}

impl EngineConfig {
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            reservation: ReservationPolicy::default(),
        }
    }

    pub fn with_reservation(mut self, reservation: ReservationPolicy) -> Self {
        self.reservation = reservation;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(AccountId::from(0))
    }
}
