use std::collections::BTreeMap;

use crate::{
    Account, AccountId, Command, CommandType, EngineConfig, Event, Ledger, LedgerError,
    PendingTransaction, ReservationPolicy, TransactionId,
};

/// Possible errors to occur while operating on conditional transactions
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EscrowError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("The caller is not allowed to perform this operation")]
    NotAuthorized,
    #[error("The referenced transaction was not found")]
    TransactionNotFound,
    #[error("The transaction conditions are not met")]
    ConditionsNotMet,
    #[error("The transaction amount has to be positive")]
    InvalidAmount,
    #[error("The command is missing the `{0}` field")]
    MissingField(&'static str),
}

impl EscrowError {
    /// Whether the error was caused by an account lacking funds
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::Ledger(LedgerError::InsufficientFunds { .. }))
    }
}

/// The conditional transaction engine
///
/// The engine owns the ledger and the registry of pending transactions.
/// Every operation takes `&mut self` and either completes or leaves the
/// engine untouched, so sharing an engine only requires serializing calls
/// (see [`crate::service`]).
#[derive(Debug)]
pub struct EscrowEngine {
    ledger: Ledger,
    /// All transactions that were neither executed nor cancelled yet
    pending: BTreeMap<TransactionId, PendingTransaction>,
    /// The id the next created transaction receives
    next_id: TransactionId,
    /// The only account allowed to update transaction conditions
    admin: AccountId,
    reservation: ReservationPolicy,
    events: Vec<Event>,
}

impl EscrowEngine {
    /// Creates a new engine with an empty ledger
    pub fn new(config: EngineConfig) -> Self {
        Self::with_ledger(config, Ledger::new())
    }

    /// Creates a new engine on top of an existing ledger
    pub fn with_ledger(config: EngineConfig, ledger: Ledger) -> Self {
        Self {
            ledger,
            pending: BTreeMap::new(),
            next_id: TransactionId::from(0),
            admin: config.admin,
            reservation: config.reservation,
            events: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the ledger, e.g. for deposits and withdrawals
    /// happening outside of conditional transactions
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }

    pub fn reservation(&self) -> ReservationPolicy {
        self.reservation
    }

    /// The id the next created transaction will receive
    pub fn next_id(&self) -> TransactionId {
        self.next_id
    }

    /// All pending transactions, ordered by id
    pub fn pending(&self) -> impl Iterator<Item = &PendingTransaction> {
        self.pending.values()
    }

    /// The events recorded since the engine was created or last drained
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Looks up a pending transaction
    ///
    /// Returns `None` for unknown ids as well as for executed or cancelled transactions.
    pub fn get_transaction(&self, id: TransactionId) -> Option<PendingTransaction> {
        self.pending.get(&id).cloned()
    }

    /// Creates a new conditional transaction with both conditions unmet
    ///
    /// The sender has to be able to cover `amount` at the time of creation.
    /// Whether the funds are also reserved depends on the engine's [`ReservationPolicy`].
    pub fn create_conditional_transaction(
        &mut self,
        sender: AccountId,
        recipient: AccountId,
        amount: u64,
    ) -> Result<TransactionId, EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidAmount);
        }

        match self.reservation {
            ReservationPolicy::Recheck => {
                let available = self.ledger.available_of(sender);
                if available < amount {
                    return Err(LedgerError::InsufficientFunds { needed: amount, available }.into());
                }
            }
            ReservationPolicy::Escrow => self.ledger.hold(sender, amount)?,
        }

        let id = self.next_id;
        self.pending.insert(id, PendingTransaction::new(id, sender, recipient, amount));
        self.next_id = id.next();

        tracing::info!(%id, %sender, %recipient, amount, "transaction created");
        self.events.push(Event::TransactionCreated { id, sender, recipient, amount });

        Ok(id)
    }

    /// Sets the on-chain condition of a pending transaction
    pub fn set_on_chain_condition(&mut self, caller: AccountId, id: TransactionId, met: bool) -> Result<(), EscrowError> {
        self.pending_for_admin(caller, id)?.set_on_chain_condition(met);

        tracing::info!(%id, met, "on-chain condition set");
        self.events.push(Event::OnChainConditionSet { id, met });

        Ok(())
    }

    /// Sets the off-chain condition of a pending transaction
    pub fn set_off_chain_condition(&mut self, caller: AccountId, id: TransactionId, met: bool) -> Result<(), EscrowError> {
        self.pending_for_admin(caller, id)?.set_off_chain_condition(met);

        tracing::info!(%id, met, "off-chain condition set");
        self.events.push(Event::OffChainConditionSet { id, met });

        Ok(())
    }

    /// Moves the funds of a transaction whose conditions are both met
    ///
    /// Anyone may execute a transaction once it is executable. If the ledger
    /// rejects the payment, the transaction stays pending.
    pub fn execute_transaction(&mut self, caller: AccountId, id: TransactionId) -> Result<(), EscrowError> {
        let transaction = self.pending
            .get(&id)
            .ok_or(EscrowError::TransactionNotFound)?;
        if !transaction.is_executable() {
            tracing::debug!(%id, "execution rejected, conditions not met");
            return Err(EscrowError::ConditionsNotMet);
        }

        let (sender, recipient, amount) = (transaction.sender(), transaction.recipient(), transaction.amount());
        match self.reservation {
            ReservationPolicy::Recheck => self.ledger.transfer(sender, recipient, amount)?,
            ReservationPolicy::Escrow => self.ledger.settle_held(sender, recipient, amount)?,
        }
        self.pending.remove(&id);

        tracing::info!(%id, executor = %caller, %sender, %recipient, amount, "transaction executed");
        self.events.push(Event::TransactionExecuted { id, executor: caller });

        Ok(())
    }

    /// Withdraws a pending transaction without moving any funds
    ///
    /// Only the sender of the transaction may cancel it.
    pub fn cancel_transaction(&mut self, caller: AccountId, id: TransactionId) -> Result<(), EscrowError> {
        let transaction = self.pending
            .get(&id)
            .ok_or(EscrowError::TransactionNotFound)?;
        if transaction.sender() != caller {
            tracing::debug!(%id, %caller, "cancellation rejected, caller is not the sender");
            return Err(EscrowError::NotAuthorized);
        }

        if self.reservation == ReservationPolicy::Escrow {
            self.ledger.release(transaction.sender(), transaction.amount())?;
        }
        self.pending.remove(&id);

        tracing::info!(%id, "transaction cancelled");
        self.events.push(Event::TransactionCancelled { id });

        Ok(())
    }

    /// Hands the admin role over to another account
    pub fn set_admin(&mut self, caller: AccountId, admin: AccountId) -> Result<(), EscrowError> {
        self.ensure_admin(caller)?;
        let previous = std::mem::replace(&mut self.admin, admin);

        tracing::info!(%previous, %admin, "admin changed");
        self.events.push(Event::AdminChanged { previous, admin });

        Ok(())
    }

    /// Applies one script command to the engine
    pub fn handle_command(&mut self, command: Command) -> Result<(), EscrowError> {
        let caller = command.caller();
        let tx = || command.tx().ok_or(EscrowError::MissingField("tx"));
        let counterparty = || command.counterparty().ok_or(EscrowError::MissingField("counterparty"));
        let amount = || command.amount().ok_or(EscrowError::MissingField("amount"));
        let met = || command.met().ok_or(EscrowError::MissingField("met"));

        match command.command_type() {
            CommandType::Deposit => self.ledger.deposit(caller, amount()?)?,
            CommandType::Withdraw => self.ledger.withdraw(caller, amount()?)?,
            CommandType::Create => {
                self.create_conditional_transaction(caller, counterparty()?, amount()?)?;
            }
            CommandType::OnChain => self.set_on_chain_condition(caller, tx()?, met()?)?,
            CommandType::OffChain => self.set_off_chain_condition(caller, tx()?, met()?)?,
            CommandType::Execute => self.execute_transaction(caller, tx()?)?,
            CommandType::Cancel => self.cancel_transaction(caller, tx()?)?,
            CommandType::Admin => self.set_admin(caller, counterparty()?)?,
        }

        Ok(())
    }

    /// The accounts of the ledger, ordered by id
    pub fn accounts(&self) -> Vec<&Account> {
        let mut accounts = self.ledger.accounts().values().collect::<Vec<_>>();
        accounts.sort_by_key(|account| account.id());
        accounts
    }

    fn ensure_admin(&self, caller: AccountId) -> Result<(), EscrowError> {
        match caller == self.admin {
            true => Ok(()),
            false => {
                tracing::debug!(%caller, admin = %self.admin, "caller is not the admin");
                Err(EscrowError::NotAuthorized)
            }
        }
    }

    fn pending_for_admin(&mut self, caller: AccountId, id: TransactionId) -> Result<&mut PendingTransaction, EscrowError> {
        self.ensure_admin(caller)?;
        self.pending
            .get_mut(&id)
            .ok_or(EscrowError::TransactionNotFound)
    }
}

impl Default for EscrowEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const ADMIN: u32 = 0;
    const SENDER: u32 = 1;
    const RECIPIENT: u32 = 2;
    const STRANGER: u32 = 3;

    fn id(n: u32) -> AccountId {
        AccountId::from(n)
    }

    fn tx(n: u64) -> TransactionId {
        TransactionId::from(n)
    }

    fn engine(reservation: ReservationPolicy, balance: u64) -> EscrowEngine {
        let mut engine = EscrowEngine::new(EngineConfig::new(id(ADMIN)).with_reservation(reservation));
        engine.ledger_mut().deposit(id(SENDER), balance).unwrap();
        engine
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct ExpectedAccount {
        client: AccountId,
        available: u64,
        held: u64,
        total: u64,
    }

    macro_rules! engine_test {
        (
            $name:ident
            $reservation:ident
            $commands:literal
            $solution:literal
        ) => {
            #[test]
            fn $name() {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(true)
                    .trim(csv::Trim::All)
                    .from_reader($commands.as_bytes());
                let config = EngineConfig::new(id(ADMIN)).with_reservation(ReservationPolicy::$reservation);
                let mut engine = EscrowEngine::new(config);

                for command in reader.deserialize() {
                    let _ = engine.handle_command(command.unwrap());
                }

                let mut expected = csv::ReaderBuilder::new()
                    .has_headers(true)
                    .trim(csv::Trim::All)
                    .from_reader($solution.as_bytes());
                let expected = expected
                    .deserialize::<ExpectedAccount>()
                    .map(Result::unwrap)
                    .collect::<Vec<_>>();
                let actual = engine
                    .accounts()
                    .into_iter()
                    .map(|account| ExpectedAccount {
                        client: account.id(),
                        available: account.available(),
                        held: account.held(),
                        total: account.total(),
                    })
                    .collect::<Vec<_>>();
                assert_eq!(actual, expected);
            }
        };
    }

    engine_test!(gated_execution Recheck
        r#"type,    caller, tx, counterparty, amount, met
           deposit,      1,   ,             ,  10000,
           create,       1,   ,            2,   1000,
           onchain,      0,  0,             ,       , true
           offchain,     0,  0,             ,       , false
           execute,      3,  0,             ,       ,
           offchain,     0,  0,             ,       , true
           execute,      3,  0,             ,       ,"#
        r#"client, available, held, total
                1,      9000,    0,  9000
                2,      1000,    0,  1000"#
    );
    engine_test!(cancelled_by_sender Recheck
        r#"type,    caller, tx, counterparty, amount, met
           deposit,      1,   ,             ,  10000,
           create,       1,   ,            2,   1000,
           cancel,       2,  0,             ,       ,
           cancel,       1,  0,             ,       ,
           onchain,      0,  0,             ,       , true
           offchain,     0,  0,             ,       , true
           execute,      1,  0,             ,       ,"#
        r#"client, available, held, total
                1,     10000,    0, 10000"#
    );
    engine_test!(late_failure_when_funds_are_spent Recheck
        r#"type,    caller, tx, counterparty, amount, met
           deposit,      1,   ,             ,    100,
           create,       1,   ,            2,     80,
           withdraw,     1,   ,             ,     50,
           onchain,      0,  0,             ,       , true
           offchain,     0,  0,             ,       , true
           execute,      2,  0,             ,       ,"#
        r#"client, available, held, total
                1,        50,    0,    50"#
    );
    engine_test!(escrowed_funds_cannot_be_spent Escrow
        r#"type,    caller, tx, counterparty, amount, met
           deposit,      1,   ,             ,    100,
           create,       1,   ,            2,     80,
           withdraw,     1,   ,             ,     50,
           onchain,      0,  0,             ,       , true
           offchain,     0,  0,             ,       , true
           execute,      2,  0,             ,       ,"#
        r#"client, available, held, total
                1,        20,    0,    20
                2,        80,    0,    80"#
    );
    engine_test!(escrow_released_on_cancel Escrow
        r#"type,    caller, tx, counterparty, amount, met
           deposit,      1,   ,             ,    100,
           create,       1,   ,            2,     30,
           create,       1,   ,            2,     40,
           cancel,       1,  0,             ,       ,"#
        r#"client, available, held, total
                1,        60,   40,   100"#
    );
    engine_test!(admin_transfer Recheck
        r#"type,    caller, tx, counterparty, amount, met
           deposit,      1,   ,             ,    100,
           create,       1,   ,            2,    100,
           admin,        0,   ,            5,       ,
           onchain,      0,  0,             ,       , true
           offchain,     0,  0,             ,       , true
           execute,      1,  0,             ,       ,
           onchain,      5,  0,             ,       , true
           offchain,     5,  0,             ,       , true
           execute,      1,  0,             ,       ,"#
        r#"client, available, held, total
                1,         0,    0,     0
                2,       100,    0,   100"#
    );
    engine_test!(missing_fields_are_skipped Recheck
        r#"type,    caller, tx, counterparty, amount, met
           deposit,      1,   ,             ,    100,
           create,       1,   ,             ,     10,
           create,       1,   ,            2,       ,
           deposit,      2,   ,             ,       ,"#
        r#"client, available, held, total
                1,       100,    0,   100"#
    );

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);

        assert_eq!(engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10), Ok(tx(0)));
        assert_eq!(engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10), Ok(tx(1)));
        engine.cancel_transaction(id(SENDER), tx(1)).unwrap();
        assert_eq!(engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10), Ok(tx(2)));
        assert!(engine.get_transaction(tx(1)).is_none());
    }

    #[test]
    fn creation_does_not_touch_balances() {
        for reservation in [ReservationPolicy::Recheck, ReservationPolicy::Escrow] {
            let mut engine = engine(reservation, 100);

            let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 100).unwrap();

            assert_eq!(engine.ledger().balance_of(id(SENDER)), 100);
            assert_eq!(engine.ledger().balance_of(id(RECIPIENT)), 0);
            let transaction = engine.get_transaction(created).unwrap();
            assert_eq!(transaction.sender(), id(SENDER));
            assert_eq!(transaction.recipient(), id(RECIPIENT));
            assert_eq!(transaction.amount(), 100);
            assert!(!transaction.on_chain_condition_met());
            assert!(!transaction.off_chain_condition_met());
        }
    }

    #[test]
    fn creation_without_funds_changes_nothing() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);

        let err = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 101).unwrap_err();

        assert!(err.is_insufficient_funds());
        assert_eq!(engine.next_id(), tx(0));
        assert_eq!(engine.pending().count(), 0);
        assert!(engine.events().is_empty());
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);

        assert_eq!(
            engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 0),
            Err(EscrowError::InvalidAmount),
        );
        assert_eq!(engine.next_id(), tx(0));
    }

    #[test]
    fn only_the_admin_sets_conditions() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);
        let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10).unwrap();

        for caller in [SENDER, RECIPIENT, STRANGER] {
            assert_eq!(engine.set_on_chain_condition(id(caller), created, true), Err(EscrowError::NotAuthorized));
            assert_eq!(engine.set_off_chain_condition(id(caller), created, true), Err(EscrowError::NotAuthorized));
        }
        let transaction = engine.get_transaction(created).unwrap();
        assert!(!transaction.on_chain_condition_met());
        assert!(!transaction.off_chain_condition_met());
    }

    #[test]
    fn authorization_is_checked_before_existence() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);

        assert_eq!(engine.set_on_chain_condition(id(STRANGER), tx(9), true), Err(EscrowError::NotAuthorized));
        assert_eq!(engine.set_on_chain_condition(id(ADMIN), tx(9), true), Err(EscrowError::TransactionNotFound));
        assert_eq!(engine.set_off_chain_condition(id(ADMIN), tx(9), true), Err(EscrowError::TransactionNotFound));
    }

    #[test]
    fn conditions_are_independent_and_idempotent() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);
        let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10).unwrap();

        engine.set_on_chain_condition(id(ADMIN), created, true).unwrap();
        engine.set_on_chain_condition(id(ADMIN), created, true).unwrap();
        let transaction = engine.get_transaction(created).unwrap();
        assert!(transaction.on_chain_condition_met());
        assert!(!transaction.off_chain_condition_met());

        engine.set_off_chain_condition(id(ADMIN), created, true).unwrap();
        engine.set_on_chain_condition(id(ADMIN), created, false).unwrap();
        let transaction = engine.get_transaction(created).unwrap();
        assert!(!transaction.on_chain_condition_met());
        assert!(transaction.off_chain_condition_met());
    }

    #[test]
    fn execution_requires_both_conditions() {
        let flags = [(false, false), (true, false), (false, true)];
        for (on_chain, off_chain) in flags {
            let mut engine = engine(ReservationPolicy::Recheck, 100);
            let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10).unwrap();
            engine.set_on_chain_condition(id(ADMIN), created, on_chain).unwrap();
            engine.set_off_chain_condition(id(ADMIN), created, off_chain).unwrap();

            assert_eq!(engine.execute_transaction(id(STRANGER), created), Err(EscrowError::ConditionsNotMet));
            assert_eq!(engine.ledger().balance_of(id(SENDER)), 100);
            assert_eq!(engine.ledger().balance_of(id(RECIPIENT)), 0);
            assert!(engine.get_transaction(created).is_some());
        }
    }

    #[test]
    fn anyone_can_execute_and_only_once() {
        let mut engine = engine(ReservationPolicy::Recheck, 10_000);
        let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 1000).unwrap();
        engine.set_on_chain_condition(id(ADMIN), created, true).unwrap();
        engine.set_off_chain_condition(id(ADMIN), created, true).unwrap();

        engine.execute_transaction(id(STRANGER), created).unwrap();

        assert_eq!(engine.ledger().balance_of(id(SENDER)), 9000);
        assert_eq!(engine.ledger().balance_of(id(RECIPIENT)), 1000);
        assert!(engine.get_transaction(created).is_none());
        assert_eq!(engine.execute_transaction(id(STRANGER), created), Err(EscrowError::TransactionNotFound));
        assert_eq!(engine.cancel_transaction(id(SENDER), created), Err(EscrowError::TransactionNotFound));
    }

    #[test]
    fn failed_execution_keeps_the_transaction_pending() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);
        let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 80).unwrap();
        engine.set_on_chain_condition(id(ADMIN), created, true).unwrap();
        engine.set_off_chain_condition(id(ADMIN), created, true).unwrap();
        engine.ledger_mut().withdraw(id(SENDER), 50).unwrap();

        let err = engine.execute_transaction(id(RECIPIENT), created).unwrap_err();

        assert!(err.is_insufficient_funds());
        assert!(engine.get_transaction(created).is_some());
        assert_eq!(engine.ledger().balance_of(id(SENDER)), 50);
        assert_eq!(engine.ledger().balance_of(id(RECIPIENT)), 0);

        engine.ledger_mut().deposit(id(SENDER), 30).unwrap();
        engine.execute_transaction(id(RECIPIENT), created).unwrap();
        assert_eq!(engine.ledger().balance_of(id(RECIPIENT)), 80);
    }

    #[test]
    fn escrow_reserves_funds_until_resolution() {
        let mut engine = engine(ReservationPolicy::Escrow, 100);
        let first = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 60).unwrap();

        assert_eq!(engine.ledger().available_of(id(SENDER)), 40);
        assert!(engine
            .create_conditional_transaction(id(SENDER), id(RECIPIENT), 41)
            .unwrap_err()
            .is_insufficient_funds());
        assert_eq!(engine.next_id(), tx(1));

        engine.set_on_chain_condition(id(ADMIN), first, true).unwrap();
        engine.set_off_chain_condition(id(ADMIN), first, true).unwrap();
        engine.execute_transaction(id(STRANGER), first).unwrap();

        assert_eq!(engine.ledger().balance_of(id(SENDER)), 40);
        assert_eq!(engine.ledger().held_of(id(SENDER)), 0);
        assert_eq!(engine.ledger().balance_of(id(RECIPIENT)), 60);
    }

    #[test]
    fn only_the_sender_cancels() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);
        engine.set_admin(id(ADMIN), id(RECIPIENT)).unwrap();
        let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10).unwrap();

        assert_eq!(engine.cancel_transaction(id(RECIPIENT), created), Err(EscrowError::NotAuthorized));
        assert_eq!(engine.cancel_transaction(id(STRANGER), created), Err(EscrowError::NotAuthorized));
        assert_eq!(engine.cancel_transaction(id(SENDER), tx(5)), Err(EscrowError::TransactionNotFound));

        engine.cancel_transaction(id(SENDER), created).unwrap();
        assert!(engine.get_transaction(created).is_none());
        assert_eq!(engine.ledger().balance_of(id(SENDER)), 100);
    }

    #[test]
    fn admin_changes_are_restricted_to_the_admin() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);
        let created = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10).unwrap();

        assert_eq!(engine.set_admin(id(STRANGER), id(STRANGER)), Err(EscrowError::NotAuthorized));
        engine.set_admin(id(ADMIN), id(STRANGER)).unwrap();

        assert_eq!(engine.admin(), id(STRANGER));
        assert_eq!(engine.set_on_chain_condition(id(ADMIN), created, true), Err(EscrowError::NotAuthorized));
        engine.set_on_chain_condition(id(STRANGER), created, true).unwrap();
        assert_eq!(engine.get_transaction(created).unwrap().amount(), 10);
    }

    #[test]
    fn events_tell_execution_and_cancellation_apart() {
        let mut engine = engine(ReservationPolicy::Recheck, 100);
        let executed = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10).unwrap();
        let cancelled = engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), 10).unwrap();
        engine.set_on_chain_condition(id(ADMIN), executed, true).unwrap();
        engine.set_off_chain_condition(id(ADMIN), executed, true).unwrap();
        engine.execute_transaction(id(STRANGER), executed).unwrap();
        engine.cancel_transaction(id(SENDER), cancelled).unwrap();
        let _ = engine.cancel_transaction(id(SENDER), cancelled);

        let events = engine.drain_events();
        assert_eq!(events.len(), 6);
        assert_eq!(events[4], Event::TransactionExecuted { id: executed, executor: id(STRANGER) });
        assert_eq!(events[5], Event::TransactionCancelled { id: cancelled });
        assert!(engine.events().is_empty());
    }

    proptest! {
        #[test]
        fn ids_follow_successful_creations(amounts in prop::collection::vec(0u64..200, 0..24)) {
            let mut engine = engine(ReservationPolicy::Escrow, 1_000);
            let mut expected = 0u64;

            for amount in amounts {
                match engine.create_conditional_transaction(id(SENDER), id(RECIPIENT), amount) {
                    Ok(created) => {
                        prop_assert_eq!(created, tx(expected));
                        expected += 1;
                    }
                    Err(_) => prop_assert_eq!(engine.next_id(), tx(expected)),
                }
                prop_assert_eq!(engine.ledger().balance_of(id(SENDER)), 1_000);
            }
            prop_assert_eq!(engine.pending().count() as u64, expected);
        }
    }
}
