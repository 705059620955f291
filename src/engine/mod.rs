//! Ledger engine module.
//!
//! This module contains the core retail-banking ledger logic including:
//! - `LedgerEngine` - The money-movement operations and balance derivation
//! - `LedgerStore` / `MemoryStore` - The append-only transaction log and
//!   account records
//! - `Account` / `Transaction` types - The ledger's data model
//! - `Command` types - The CSV batch surface external callers drive
//! - `Error` types - Batch, command and ledger errors

mod account;
mod batch;
mod command;
mod config;
mod error;
mod ledger;
mod locks;
mod store;
mod transaction;

pub(crate) use rust_decimal::Decimal;

pub use account::{Account, AccountId, AccountKind, AccountNumber, InvalidAccountNumber, Profile};
pub use batch::{AccountSummary, BatchOutcome};
pub use command::{Command, CommandOp, CommandRecord};
pub use config::LedgerConfig;
pub use error::{BatchError, CommandError, LedgerError};
pub use ledger::LedgerEngine;
pub use store::{LedgerStore, MemoryStore, StoreError};
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionKind};
