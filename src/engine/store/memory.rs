use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use rust_decimal::Decimal;

use super::{LedgerStore, StoreError};
use crate::engine::account::{Account, AccountId, AccountKind, AccountNumber, Profile};
use crate::engine::transaction::{NewTransaction, Transaction, TransactionId};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    /// Account-number uniqueness index.
    by_number: HashMap<AccountNumber, AccountId>,
    /// The append-only log, in commit order.
    log: Vec<Transaction>,
    next_account_id: AccountId,
    next_transaction_id: TransactionId,
}

/// Thread-safe in-memory [`LedgerStore`].
///
/// A single `RwLock` guards the whole state, so every trait call sees a
/// consistent snapshot and `append` is all-or-nothing by construction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        log::trace!("MemoryStore initialized");
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl LedgerStore for MemoryStore {
    fn create_account(
        &self,
        number: AccountNumber,
        kind: AccountKind,
        profile: Profile,
    ) -> Result<Account, StoreError> {
        let mut state = self.write()?;
        if state.by_number.contains_key(&number) {
            return Err(StoreError::DuplicateAccountNumber { number });
        }
        state.next_account_id += 1;
        let account = Account::new(state.next_account_id, number, kind, profile, Utc::now());
        state.by_number.insert(account.number().clone(), account.id());
        state.accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    fn account_by_number(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError> {
        let state = self.read()?;
        Ok(state
            .by_number
            .get(number)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.get(&id).cloned())
    }

    fn update_profile(&self, id: AccountId, profile: Profile) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::ConstraintViolation(format!("unknown account id {id}")))?;
        account.set_profile(profile);
        Ok(())
    }

    fn transactions(&self, account: AccountId) -> Result<Vec<Transaction>, StoreError> {
        let state = self.read()?;
        Ok(state
            .log
            .iter()
            .filter(|tx| tx.account() == account)
            .cloned()
            .collect())
    }

    fn append(&self, batch: Vec<NewTransaction>) -> Result<Vec<Transaction>, StoreError> {
        let mut state = self.write()?;

        // Validate the whole batch before touching the log so a bad row can
        // never leave a partial batch behind.
        for new in &batch {
            if !state.accounts.contains_key(&new.account) {
                return Err(StoreError::ConstraintViolation(format!(
                    "unknown account id {}",
                    new.account
                )));
            }
            if new.amount <= Decimal::ZERO {
                return Err(StoreError::ConstraintViolation(format!(
                    "non-positive amount {}",
                    new.amount
                )));
            }
        }

        let now = Utc::now();
        let mut committed = Vec::with_capacity(batch.len());
        for new in batch {
            state.next_transaction_id += 1;
            let tx = Transaction::commit(state.next_transaction_id, new, now);
            state.log.push(tx.clone());
            committed.push(tx);
        }
        Ok(committed)
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let state = self.read()?;
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.number().cmp(b.number()));
        Ok(accounts)
    }
}
