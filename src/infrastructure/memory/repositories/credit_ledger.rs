use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::repositories::credit_ledger::{CreditError, CreditLedger};

/// Process-memory ledger. The whole map sits behind one mutex and every
/// reserve performs its check and debit inside a single critical section,
/// which is what makes concurrent reservations against the same user safe.
pub struct MemoryCreditLedger {
    accounts: Mutex<HashMap<Uuid, i64>>,
}

impl MemoryCreditLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCreditLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CreditLedger for MemoryCreditLedger {
    async fn open_account(&self, user_id: Uuid, initial_balance: i64) -> Result<(), CreditError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&user_id) {
            return Err(CreditError::AlreadyOpen(user_id));
        }
        accounts.insert(user_id, initial_balance.max(0));
        Ok(())
    }

    async fn balance(&self, user_id: Uuid) -> Result<i64, CreditError> {
        let accounts = self.accounts.lock().await;
        accounts
            .get(&user_id)
            .copied()
            .ok_or(CreditError::UnknownUser(user_id))
    }

    async fn reserve(&self, user_id: Uuid, amount: i64) -> Result<i64, CreditError> {
        let mut accounts = self.accounts.lock().await;
        let balance = accounts
            .get_mut(&user_id)
            .ok_or(CreditError::UnknownUser(user_id))?;
        if *balance < amount {
            return Err(CreditError::Insufficient {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }

    async fn refund(&self, user_id: Uuid, amount: i64) -> Result<i64, CreditError> {
        let mut accounts = self.accounts.lock().await;
        let balance = accounts
            .get_mut(&user_id)
            .ok_or(CreditError::UnknownUser(user_id))?;
        *balance += amount;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn reserve_debits_and_refund_credits() {
        let ledger = MemoryCreditLedger::new();
        let user_id = Uuid::new_v4();
        ledger.open_account(user_id, 5).await.unwrap();

        assert_eq!(ledger.reserve(user_id, 2).await.unwrap(), 3);
        assert_eq!(ledger.refund(user_id, 2).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn reserve_rejects_insufficient_balance_without_debiting() {
        let ledger = MemoryCreditLedger::new();
        let user_id = Uuid::new_v4();
        ledger.open_account(user_id, 1).await.unwrap();

        let err = ledger.reserve(user_id, 8).await.unwrap_err();
        assert_eq!(
            err,
            CreditError::Insufficient {
                required: 8,
                available: 1,
            }
        );
        assert_eq!(ledger.balance(user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_a_distinct_error() {
        let ledger = MemoryCreditLedger::new();
        let user_id = Uuid::new_v4();
        assert_eq!(
            ledger.balance(user_id).await.unwrap_err(),
            CreditError::UnknownUser(user_id)
        );
    }

    #[tokio::test]
    async fn duplicate_open_account_is_rejected() {
        let ledger = MemoryCreditLedger::new();
        let user_id = Uuid::new_v4();
        ledger.open_account(user_id, 5).await.unwrap();
        assert_eq!(
            ledger.open_account(user_id, 5).await.unwrap_err(),
            CreditError::AlreadyOpen(user_id)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservations_never_oversubscribe() {
        let ledger = Arc::new(MemoryCreditLedger::new());
        let user_id = Uuid::new_v4();
        ledger.open_account(user_id, 10).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(
                async move { ledger.reserve(user_id, 3).await },
            ));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        // floor(10 / 3) reservations may win; the rest must be rejected.
        assert_eq!(successes, 3);
        assert_eq!(ledger.balance(user_id).await.unwrap(), 1);
    }
}
