use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreditError {
    #[error("insufficient credits: required {required}, available {available}")]
    Insufficient { required: i64, available: i64 },
    #[error("no credit account for user {0}")]
    UnknownUser(Uuid),
    #[error("credit account already open for user {0}")]
    AlreadyOpen(Uuid),
}

/// Owns per-user credit balances. `reserve` must be a single atomic step
/// relative to concurrent reservations against the same user; the balance
/// invariant is `>= 0` at all times.
#[async_trait]
#[automock]
pub trait CreditLedger {
    async fn open_account(&self, user_id: Uuid, initial_balance: i64) -> Result<(), CreditError>;

    async fn balance(&self, user_id: Uuid) -> Result<i64, CreditError>;

    /// Atomically checks and debits `amount`; returns the remaining balance
    /// or `CreditError::Insufficient` without mutating anything.
    async fn reserve(&self, user_id: Uuid, amount: i64) -> Result<i64, CreditError>;

    /// Credits `amount` back unconditionally. The orchestrator guarantees
    /// at most one refund per job.
    async fn refund(&self, user_id: Uuid, amount: i64) -> Result<i64, CreditError>;
}
