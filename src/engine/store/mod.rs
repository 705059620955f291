//! Ledger storage.
//!
//! The store is the single shared resource: an append-only transaction log
//! plus the account identity records. It exposes exactly the primitives the
//! engine needs, the important one being [`LedgerStore::append`], which
//! persists a batch of rows all-or-nothing.

mod memory;

pub use memory::MemoryStore;

use super::account::{Account, AccountId, AccountKind, AccountNumber, Profile};
use super::transaction::{NewTransaction, Transaction};

/// Storage failures.
///
/// `Unavailable` is fatal to the calling operation and surfaced as-is;
/// the other variants are constraint checks the engine reacts to.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("account number {number} already exists")]
    DuplicateAccountNumber { number: AccountNumber },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Durable, queryable storage for accounts and the transaction log.
///
/// Implementations must make every method individually atomic: a call either
/// observes and produces a consistent state or fails without effect. Cross-
/// call read-check-write atomicity on debits is the engine's responsibility
/// (it holds a per-account lock around the sequence).
pub trait LedgerStore: Send + Sync {
    /// Persist a freshly opened account, assigning its internal id and
    /// opening timestamp. Fails with [`StoreError::DuplicateAccountNumber`]
    /// if the number is taken; nothing is recorded in that case.
    fn create_account(
        &self,
        number: AccountNumber,
        kind: AccountKind,
        profile: Profile,
    ) -> Result<Account, StoreError>;

    /// Look an account up by its public number.
    fn account_by_number(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError>;

    /// Look an account up by its internal id.
    fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Replace the opaque profile on an account. Ledger-relevant fields are
    /// untouched; fails with [`StoreError::ConstraintViolation`] for an
    /// unknown account.
    fn update_profile(&self, id: AccountId, profile: Profile) -> Result<(), StoreError>;

    /// All committed rows for one account, ordered by creation ascending.
    /// Each call returns a fresh consistent snapshot; re-reads are idempotent.
    fn transactions(&self, account: AccountId) -> Result<Vec<Transaction>, StoreError>;

    /// Atomically commit a batch of rows: ids and timestamps are assigned in
    /// order and either every row persists or none does. The batch is
    /// validated (known accounts, positive amounts) before anything is
    /// applied.
    fn append(&self, batch: Vec<NewTransaction>) -> Result<Vec<Transaction>, StoreError>;

    /// Every account in the store, ordered by account number.
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;
}
