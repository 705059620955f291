//! A minimal retail-banking ledger.
//!
//! Balances are never stored: every account's balance is derived from its
//! append-only transaction history, and every debit re-derives it under a
//! per-account lock so concurrent debits cannot overdraw. The
//! [`LedgerEngine`] exposes the money-movement operations (open, deposit,
//! withdraw, transfer, category funding) over any [`LedgerStore`];
//! [`MemoryStore`] is the bundled thread-safe implementation.
//!
//! ```no_run
//! use ledger_engine::{AccountKind, LedgerEngine, MemoryStore, Profile};
//! use rust_decimal::Decimal;
//!
//! let engine = LedgerEngine::new(MemoryStore::new());
//! let alice = engine.open_account(AccountKind::Individual, Profile::default())?;
//! let bob = engine.open_account(AccountKind::Individual, Profile::default())?;
//!
//! engine.deposit(alice.number(), Decimal::new(500, 0), "Manual deposit")?;
//! engine.transfer(alice.number(), bob.number(), Decimal::new(200, 0), "rent")?;
//! assert_eq!(engine.balance(alice.number())?, Decimal::new(1300, 0));
//! # Ok::<(), ledger_engine::LedgerError>(())
//! ```

mod engine;

pub use engine::{
    Account, AccountId, AccountKind, AccountNumber, AccountSummary, BatchError, BatchOutcome,
    Command, CommandError, CommandOp, CommandRecord, InvalidAccountNumber, LedgerConfig,
    LedgerEngine, LedgerError, LedgerStore, MemoryStore, NewTransaction, Profile, StoreError,
    Transaction, TransactionId, TransactionKind,
};
