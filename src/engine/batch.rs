use std::collections::HashMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize, Serializer};

use super::account::{AccountKind, AccountNumber, Profile};
use super::command::{Command, CommandRecord};
use super::error::{BatchError, CommandError, LedgerError};
use super::ledger::LedgerEngine;
use super::store::{LedgerStore, StoreError};
use super::transaction::Transaction;
use super::Decimal;

/// Serialize Decimal with exactly 2 decimal places (currency minor units).
fn serialize_decimal_2dp<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

/// One row of the account export: the derived balance next to the identity
/// facts a caller needs to render a statement header.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    account: AccountNumber,
    kind: AccountKind,
    #[serde(serialize_with = "serialize_decimal_2dp")]
    balance: Decimal,
    transactions: usize,
}

impl AccountSummary {
    pub fn account(&self) -> &AccountNumber {
        &self.account
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn transactions(&self) -> usize {
        self.transactions
    }
}

/// Counters reported by [`LedgerEngine::run_commands`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub processed: u64,
    pub skipped: u64,
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Run a CSV command script from any source (file, `TcpStream`, etc.).
    ///
    /// Columns: `op,account,counterparty,kind,amount,description`. An `open`
    /// row binds the `account` column as a handle for the freshly opened
    /// account; later rows may use the handle or a raw 12-digit number.
    /// Malformed rows and unknown handles are hard errors that abort the
    /// batch, as is an unavailable store; rejected operations (insufficient
    /// funds, unknown account, bad amount) are logged and skipped.
    ///
    /// Note that the CSV reader is buffered automatically, so you should not
    /// wrap rdr in a buffered reader like `io::BufReader`.
    pub fn run_commands<R: Read>(&self, reader: R) -> Result<BatchOutcome, BatchError> {
        log::info!("Starting command batch");

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All) // trim whitespace from fields
            .from_reader(reader);

        let mut handles: HashMap<String, AccountNumber> = HashMap::new();
        let mut outcome = BatchOutcome::default();

        for result in csv_reader.deserialize() {
            // Step 1: parse the CSV record into a raw dirty CommandRecord
            let record: CommandRecord = result?;

            let row_num = outcome.processed + outcome.skipped + 1;
            log::trace!("[row {row_num}] Parsing: {record}");

            // Step 2: convert the raw record into a validated Command
            let command = Command::try_from(record)?;

            // Step 3: run the validated Command against the ledger
            match self.run_command(command, &mut handles) {
                Ok(()) => outcome.processed += 1,
                Err(BatchError::Ledger(e)) if !is_fatal(&e) => {
                    log::warn!("[row {row_num}] - Skipped: {e}");
                    outcome.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Batch complete: {} processed, {} skipped, {} accounts opened",
            outcome.processed,
            outcome.skipped,
            handles.len()
        );
        Ok(outcome)
    }

    /// Write every account's summary row to any sink (stdout, file, etc.),
    /// ordered by account number.
    ///
    /// Note that the CSV writer is buffered automatically, so you should not
    /// wrap wtr in a buffered writer like `io::BufWriter`.
    pub fn export_accounts<W: Write>(&self, writer: W) -> Result<(), BatchError> {
        let accounts = self.store().accounts().map_err(LedgerError::from)?;
        log::info!("Exporting {} accounts", accounts.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for account in accounts {
            let transactions = self.transactions(account.number())?;
            csv_writer.serialize(AccountSummary {
                account: account.number().clone(),
                kind: account.kind(),
                balance: transactions.iter().map(Transaction::signed_amount).sum(),
                transactions: transactions.len(),
            })?;
        }
        csv_writer.flush()?;

        log::trace!("Export complete");
        Ok(())
    }

    fn run_command(
        &self,
        command: Command,
        handles: &mut HashMap<String, AccountNumber>,
    ) -> Result<(), BatchError> {
        match command {
            Command::Open { handle, kind } => {
                let account = self.open_account(kind, Profile::default())?;
                log::debug!("[open] handle {handle} bound to {}", account.number());
                handles.insert(handle, account.number().clone());
            }
            Command::Deposit {
                account,
                amount,
                description,
            } => {
                let number = resolve(handles, &account)?;
                self.deposit(&number, amount, &description)?;
            }
            Command::Withdraw {
                account,
                amount,
                description,
            } => {
                let number = resolve(handles, &account)?;
                self.withdraw(&number, amount, &description)?;
            }
            Command::Transfer {
                sender,
                recipient,
                amount,
                description,
            } => {
                let sender = resolve(handles, &sender)?;
                let recipient = resolve(handles, &recipient)?;
                self.transfer(&sender, &recipient, amount, &description)?;
            }
            Command::Fund {
                account,
                category,
                amount,
                description,
            } => {
                let number = resolve(handles, &account)?;
                self.fund_category(&number, &category, amount, &description)?;
            }
        }
        Ok(())
    }
}

/// A handle must have been bound by an earlier `open` row; anything else has
/// to be a syntactically valid raw account number. Whether that number is
/// actually on the books is the engine's soft check.
fn resolve(
    handles: &HashMap<String, AccountNumber>,
    name: &str,
) -> Result<AccountNumber, CommandError> {
    if let Some(number) = handles.get(name) {
        return Ok(number.clone());
    }
    name.parse()
        .map_err(|_| CommandError::UnknownHandle(name.to_owned()))
}

fn is_fatal(error: &LedgerError) -> bool {
    matches!(error, LedgerError::Store(StoreError::Unavailable(_)))
}
