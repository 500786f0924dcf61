//! A task owning an [`EscrowEngine`] and serving requests one at a time.
//!
//! Callers talk to the task through cloneable [`EscrowHandle`]s. Every request
//! travels over a single channel and is applied to the engine to completion
//! before the next one is received, which makes each operation atomic with
//! respect to all others.
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{AccountId, EscrowEngine, EscrowError, PendingTransaction, TransactionId};

/// Possible errors to occur when calling into the escrow service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Escrow(#[from] EscrowError),
    #[error("The escrow service is no longer running")]
    Closed,
}

type Reply<T> = oneshot::Sender<Result<T, EscrowError>>;

/// A request to the escrow service, carrying the channel to answer on
#[derive(Debug)]
enum Request {
    Create {
        sender: AccountId,
        recipient: AccountId,
        amount: u64,
        reply: Reply<TransactionId>,
    },
    SetOnChainCondition {
        caller: AccountId,
        id: TransactionId,
        met: bool,
        reply: Reply<()>,
    },
    SetOffChainCondition {
        caller: AccountId,
        id: TransactionId,
        met: bool,
        reply: Reply<()>,
    },
    Execute {
        caller: AccountId,
        id: TransactionId,
        reply: Reply<()>,
    },
    Cancel {
        caller: AccountId,
        id: TransactionId,
        reply: Reply<()>,
    },
    SetAdmin {
        caller: AccountId,
        admin: AccountId,
        reply: Reply<()>,
    },
    GetTransaction {
        id: TransactionId,
        reply: oneshot::Sender<Option<PendingTransaction>>,
    },
    BalanceOf {
        account: AccountId,
        reply: oneshot::Sender<u64>,
    },
}

/// The state loop of the escrow service
pub struct EscrowService {
    engine: EscrowEngine,
    receiver: mpsc::Receiver<Request>,
}

impl EscrowService {
    /// Runs the service loop until all handles are dropped and returns the engine
    pub async fn run(mut self) -> EscrowEngine {
        while let Some(request) = self.receiver.recv().await {
            self.process(request);
        }
        tracing::debug!("all escrow handles dropped, stopping service");

        self.engine
    }

    fn process(&mut self, request: Request) {
        let engine = &mut self.engine;
        // a dropped reply receiver only means the caller stopped waiting
        match request {
            Request::Create { sender, recipient, amount, reply } => {
                let _ = reply.send(engine.create_conditional_transaction(sender, recipient, amount));
            }
            Request::SetOnChainCondition { caller, id, met, reply } => {
                let _ = reply.send(engine.set_on_chain_condition(caller, id, met));
            }
            Request::SetOffChainCondition { caller, id, met, reply } => {
                let _ = reply.send(engine.set_off_chain_condition(caller, id, met));
            }
            Request::Execute { caller, id, reply } => {
                let _ = reply.send(engine.execute_transaction(caller, id));
            }
            Request::Cancel { caller, id, reply } => {
                let _ = reply.send(engine.cancel_transaction(caller, id));
            }
            Request::SetAdmin { caller, admin, reply } => {
                let _ = reply.send(engine.set_admin(caller, admin));
            }
            Request::GetTransaction { id, reply } => {
                let _ = reply.send(engine.get_transaction(id));
            }
            Request::BalanceOf { account, reply } => {
                let _ = reply.send(engine.ledger().balance_of(account));
            }
        }
    }
}

/// Spawns the escrow service on the current tokio runtime
///
/// `capacity` bounds the number of requests waiting to be served.
pub fn spawn(engine: EscrowEngine, capacity: usize) -> (EscrowHandle, JoinHandle<EscrowEngine>) {
    let (sender, receiver) = mpsc::channel(capacity);
    let service = EscrowService { engine, receiver };

    (EscrowHandle { sender }, tokio::spawn(service.run()))
}

/// A cloneable client of the escrow service
#[derive(Clone, Debug)]
pub struct EscrowHandle {
    sender: mpsc::Sender<Request>,
}

impl EscrowHandle {
    pub async fn create_conditional_transaction(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: u64,
    ) -> Result<TransactionId, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::Create { sender, recipient, amount, reply }).await?;
        Ok(Self::receive(response).await??)
    }

    pub async fn set_on_chain_condition(&self, caller: AccountId, id: TransactionId, met: bool) -> Result<(), ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::SetOnChainCondition { caller, id, met, reply }).await?;
        Ok(Self::receive(response).await??)
    }

    pub async fn set_off_chain_condition(&self, caller: AccountId, id: TransactionId, met: bool) -> Result<(), ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::SetOffChainCondition { caller, id, met, reply }).await?;
        Ok(Self::receive(response).await??)
    }

    pub async fn execute_transaction(&self, caller: AccountId, id: TransactionId) -> Result<(), ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::Execute { caller, id, reply }).await?;
        Ok(Self::receive(response).await??)
    }

    pub async fn cancel_transaction(&self, caller: AccountId, id: TransactionId) -> Result<(), ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::Cancel { caller, id, reply }).await?;
        Ok(Self::receive(response).await??)
    }

    pub async fn set_admin(&self, caller: AccountId, admin: AccountId) -> Result<(), ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::SetAdmin { caller, admin, reply }).await?;
        Ok(Self::receive(response).await??)
    }

    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<PendingTransaction>, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::GetTransaction { id, reply }).await?;
        Self::receive(response).await
    }

    pub async fn balance_of(&self, account: AccountId) -> Result<u64, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.send(Request::BalanceOf { account, reply }).await?;
        Self::receive(response).await
    }

    async fn send(&self, request: Request) -> Result<(), ServiceError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| ServiceError::Closed)
    }

    async fn receive<T>(response: oneshot::Receiver<T>) -> Result<T, ServiceError> {
        response.await.map_err(|_| ServiceError::Closed)
    }
}
