use crate::engine::account::AccountNumber;
use crate::engine::command::CommandRecord;
use crate::engine::store::StoreError;
use crate::engine::Decimal;

/// Top-level error type for the command batch layer.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors during `CommandRecord` -> `Command` conversion (hard errors).
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid command: {0}")]
    InvalidCommand(CommandRecord),
    #[error("Unknown account handle or number: {0}")]
    UnknownHandle(String),
}

/// Errors from a single ledger operation.
///
/// Validation failures are typed and returned to the caller, never absorbed;
/// any failure aborts the whole operation before the atomic append, so the
/// ledger is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid amount: {amount} (must be positive, at most 2 decimal places)")]
    InvalidAmount { amount: Decimal },

    #[error("Insufficient funds: account {account} has {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountNumber,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Account {account} not found")]
    AccountNotFound { account: AccountNumber },

    #[error("Recipient account {account} not found")]
    RecipientNotFound { account: AccountNumber },

    #[error("Could not allocate a unique account number after {attempts} attempts")]
    AccountNumbersExhausted { attempts: u32 },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
