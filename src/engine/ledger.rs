use rand::thread_rng;

use super::account::{Account, AccountKind, AccountNumber, Profile};
use super::config::LedgerConfig;
use super::error::LedgerError;
use super::locks::AccountLocks;
use super::store::LedgerStore;
use super::transaction::{NewTransaction, Transaction, TransactionKind};
use super::Decimal;

/// The core ledger engine.
///
/// Every money movement goes through one of the operations here; this is the
/// only place funds sufficiency is enforced. The engine holds no account or
/// balance state of its own: balances are derived fresh from the store's
/// append-only log, and a per-account lock table makes each debit's
/// read-check-append sequence atomic with respect to every other debit on
/// the same account.
#[derive(Debug, Default)]
pub struct LedgerEngine<S: LedgerStore> {
    store: S,
    config: LedgerConfig,
    locks: AccountLocks,
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Create an engine over `store` with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: S, config: LedgerConfig) -> Self {
        log::trace!(
            "LedgerEngine initialized (welcome_amount={})",
            config.welcome_amount
        );
        Self {
            store,
            config,
            locks: AccountLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new account and append its seed deposit.
    ///
    /// The account number is drawn at random and collision-checked against
    /// the store, retrying up to the configured budget. If the seed append
    /// fails after the account row was persisted, the error is surfaced so
    /// the caller can detect the account-without-seed state (its balance
    /// reads as zero) and retry or clean up.
    pub fn open_account(
        &self,
        kind: AccountKind,
        profile: Profile,
    ) -> Result<Account, LedgerError> {
        let account = self.allocate_account(kind, profile)?;
        log::debug!(
            "[open] created {} account {} (id {})",
            account.kind(),
            account.number(),
            account.id()
        );

        let seed = self.store.append(vec![NewTransaction {
            account: account.id(),
            kind: TransactionKind::Deposit,
            amount: self.config.welcome_amount,
            description: self.config.welcome_description.clone(),
        }]);
        match seed {
            Ok(_) => {
                log::trace!(
                    "[open] account={} seeded with {}",
                    account.number(),
                    self.config.welcome_amount
                );
                Ok(account)
            }
            Err(e) => {
                log::error!(
                    "[open] account={} exists but its seed deposit failed: {e}",
                    account.number()
                );
                Err(e.into())
            }
        }
    }

    /// Credit an account. Deposits always succeed if storage succeeds; no
    /// balance check is involved.
    pub fn deposit(
        &self,
        account: &AccountNumber,
        amount: Decimal,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        log::trace!("[deposit] account={account} amount={amount}");
        validate_amount(amount)?;
        let account = self.require_account(account)?;

        let mut committed = self.store.append(vec![NewTransaction {
            account: account.id(),
            kind: TransactionKind::Deposit,
            amount,
            description: description.to_owned(),
        }])?;
        let tx = committed.remove(0);
        log::trace!("[deposit] account={} -> {tx}", account.number());
        Ok(tx)
    }

    /// Debit an account as a cash withdrawal. Fails with
    /// [`LedgerError::InsufficientFunds`] if the fresh balance does not
    /// cover the amount.
    pub fn withdraw(
        &self,
        account: &AccountNumber,
        amount: Decimal,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        log::trace!("[withdrawal] account={account} amount={amount}");
        self.debit(account, TransactionKind::Withdrawal, amount, description)
    }

    /// Debit an account towards a third-party category ("Betting Funding",
    /// "Data Purchase", ...). Withdraw-shaped: same balance check, one
    /// outflow row, but carrying the caller's category label.
    pub fn fund_category(
        &self,
        account: &AccountNumber,
        category: &str,
        amount: Decimal,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        log::trace!("[funding] account={account} category={category} amount={amount}");
        self.debit(
            account,
            TransactionKind::Funding(category.to_owned()),
            amount,
            description,
        )
    }

    /// Move funds between two accounts.
    ///
    /// Appends exactly two rows in one atomic batch: a `Transfer` outflow on
    /// the sender and a `Deposit` on the recipient, each describing the
    /// counterparty. Both accounts stay locked (ascending id order) for the
    /// balance check and the append. Sending to oneself is allowed and nets
    /// to zero.
    pub fn transfer(
        &self,
        sender: &AccountNumber,
        recipient: &AccountNumber,
        amount: Decimal,
        description: &str,
    ) -> Result<(Transaction, Transaction), LedgerError> {
        log::trace!("[transfer] sender={sender} recipient={recipient} amount={amount}");
        validate_amount(amount)?;
        let sender = self.require_account(sender)?;
        let recipient = self
            .store
            .account_by_number(recipient)?
            .ok_or_else(|| LedgerError::RecipientNotFound {
                account: recipient.clone(),
            })?;

        self.locks.with_pair(sender.id(), recipient.id(), || {
            let available = self.balance_of(sender.id())?;
            if amount > available {
                return Err(LedgerError::InsufficientFunds {
                    account: sender.number().clone(),
                    available,
                    requested: amount,
                });
            }

            let mut committed = self.store.append(vec![
                NewTransaction {
                    account: sender.id(),
                    kind: TransactionKind::Transfer,
                    amount,
                    description: counterparty_note("Transfer to", recipient.number(), description),
                },
                NewTransaction {
                    account: recipient.id(),
                    kind: TransactionKind::Deposit,
                    amount,
                    description: counterparty_note("Transfer from", sender.number(), description),
                },
            ])?;
            let credit = committed.remove(1);
            let debit = committed.remove(0);
            log::trace!(
                "[transfer] {} -> {} amount={amount} committed (tx {} / {})",
                sender.number(),
                recipient.number(),
                debit.id(),
                credit.id()
            );
            Ok((debit, credit))
        })
    }

    /// Derive an account's balance from its full transaction history.
    /// Pure read: inflow rows count positive, everything else negative.
    pub fn balance(&self, account: &AccountNumber) -> Result<Decimal, LedgerError> {
        let account = self.require_account(account)?;
        Ok(self.balance_of(account.id())?)
    }

    /// The account's committed rows, ordered by creation ascending.
    /// Newest-first display is the caller's reversal.
    pub fn transactions(&self, account: &AccountNumber) -> Result<Vec<Transaction>, LedgerError> {
        let account = self.require_account(account)?;
        Ok(self.store.transactions(account.id())?)
    }

    /// Replace the opaque profile metadata on an account. Never touches
    /// ledger state.
    pub fn update_profile(
        &self,
        account: &AccountNumber,
        profile: Profile,
    ) -> Result<Account, LedgerError> {
        let account = self.require_account(account)?;
        self.store.update_profile(account.id(), profile)?;
        log::debug!("[profile] account={} updated", account.number());
        Ok(self
            .store
            .account(account.id())?
            .ok_or(LedgerError::AccountNotFound {
                account: account.number().clone(),
            })?)
    }
}

// =============================================================================
// Internals
// =============================================================================

impl<S: LedgerStore> LedgerEngine<S> {
    fn allocate_account(
        &self,
        kind: AccountKind,
        profile: Profile,
    ) -> Result<Account, LedgerError> {
        let budget = self.config.number_retry_budget.max(1);
        for attempt in 1..=budget {
            let number = AccountNumber::generate(&mut thread_rng());
            match self.store.create_account(number, kind, profile.clone()) {
                Ok(account) => return Ok(account),
                Err(super::store::StoreError::DuplicateAccountNumber { number }) => {
                    log::warn!("[open] number collision on {number} (attempt {attempt}/{budget})");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(LedgerError::AccountNumbersExhausted { attempts: budget })
    }

    /// Shared read-check-append path for `withdraw` and `fund_category`,
    /// executed under the account's lock.
    fn debit(
        &self,
        account: &AccountNumber,
        kind: TransactionKind,
        amount: Decimal,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;
        let account = self.require_account(account)?;

        self.locks.with_account(account.id(), || {
            let available = self.balance_of(account.id())?;
            if amount > available {
                return Err(LedgerError::InsufficientFunds {
                    account: account.number().clone(),
                    available,
                    requested: amount,
                });
            }

            let mut committed = self.store.append(vec![NewTransaction {
                account: account.id(),
                kind,
                amount,
                description: description.to_owned(),
            }])?;
            let tx = committed.remove(0);
            log::trace!(
                "[debit] account={} amount={amount} -> new_balance={}",
                account.number(),
                available - amount
            );
            Ok(tx)
        })
    }

    fn balance_of(&self, id: super::account::AccountId) -> Result<Decimal, super::store::StoreError> {
        let sum = self
            .store
            .transactions(id)?
            .iter()
            .map(Transaction::signed_amount)
            .sum();
        Ok(sum)
    }

    fn require_account(&self, number: &AccountNumber) -> Result<Account, LedgerError> {
        self.store
            .account_by_number(number)?
            .ok_or_else(|| LedgerError::AccountNotFound {
                account: number.clone(),
            })
    }
}

/// Amounts must be strictly positive with at most two decimal places
/// (currency minor units). Re-checked here even though callers pre-validate.
fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount > Decimal::ZERO && amount.scale() <= 2 {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount { amount })
    }
}

fn counterparty_note(prefix: &str, counterparty: &AccountNumber, description: &str) -> String {
    if description.is_empty() {
        format!("{prefix} {counterparty}")
    } else {
        format!("{prefix} {counterparty}: {description}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::{MemoryStore, StoreError};
    use rust_decimal_macros::dec;

    fn engine() -> LedgerEngine<MemoryStore> {
        LedgerEngine::new(MemoryStore::new())
    }

    fn open(engine: &LedgerEngine<MemoryStore>) -> Account {
        engine
            .open_account(AccountKind::Individual, Profile::default())
            .unwrap()
    }

    #[test]
    fn test_open_account_seeds_welcome_balance() {
        let engine = engine();
        let account = open(&engine);

        assert_eq!(engine.balance(account.number()).unwrap(), dec!(1000));
        let txs = engine.transactions(account.number()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind(), &TransactionKind::Deposit);
        assert_eq!(txs[0].description(), "Welcome bonus");
    }

    #[test]
    fn test_configured_welcome_amount() {
        let config = LedgerConfig {
            welcome_amount: dec!(250),
            ..LedgerConfig::default()
        };
        let engine = LedgerEngine::with_config(MemoryStore::new(), config);
        let account = open(&engine);
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(250));
    }

    #[test]
    fn test_deposit_increases_balance() {
        let engine = engine();
        let account = open(&engine);

        let tx = engine
            .deposit(account.number(), dec!(500), "Manual deposit")
            .unwrap();
        assert_eq!(tx.amount(), dec!(500));
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(1500));
    }

    #[test]
    fn test_withdraw_within_balance() {
        let engine = engine();
        let account = open(&engine);

        engine
            .withdraw(account.number(), dec!(400), "Cash withdrawal")
            .unwrap();
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(600));
    }

    #[test]
    fn test_withdraw_over_balance_fails_and_changes_nothing() {
        let engine = engine();
        let account = open(&engine);
        engine.deposit(account.number(), dec!(500), "top-up").unwrap();

        let result = engine.withdraw(account.number(), dec!(2000), "too much");
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                available,
                requested,
                ..
            }) if available == dec!(1500) && requested == dec!(2000)
        ));
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(1500));
        assert_eq!(engine.transactions(account.number()).unwrap().len(), 2);
    }

    #[test]
    fn test_fund_category_is_an_outflow_with_label() {
        let engine = engine();
        let account = open(&engine);

        let tx = engine
            .fund_category(
                account.number(),
                "Betting Funding",
                dec!(150),
                "Funded Bet9ja account (u-42)",
            )
            .unwrap();
        assert_eq!(tx.kind(), &TransactionKind::Funding("Betting Funding".into()));
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(850));
    }

    #[test]
    fn test_fund_category_checks_balance() {
        let engine = engine();
        let account = open(&engine);

        let result = engine.fund_category(account.number(), "Data Purchase", dec!(1500), "bundle");
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(1000));
    }

    #[test]
    fn test_transfer_moves_funds_and_references_counterparties() {
        let engine = engine();
        let a = open(&engine);
        let b = open(&engine);

        let (debit, credit) = engine
            .transfer(a.number(), b.number(), dec!(250), "")
            .unwrap();

        assert_eq!(debit.kind(), &TransactionKind::Transfer);
        assert_eq!(credit.kind(), &TransactionKind::Deposit);
        assert_eq!(debit.account(), a.id());
        assert_eq!(credit.account(), b.id());
        assert_eq!(
            debit.description(),
            format!("Transfer to {}", b.number())
        );
        assert_eq!(
            credit.description(),
            format!("Transfer from {}", a.number())
        );
        assert_eq!(engine.balance(a.number()).unwrap(), dec!(750));
        assert_eq!(engine.balance(b.number()).unwrap(), dec!(1250));
    }

    #[test]
    fn test_transfer_to_unknown_recipient_changes_nothing() {
        let engine = engine();
        let a = open(&engine);
        let ghost: AccountNumber = "999999999999".parse().unwrap();

        let result = engine.transfer(a.number(), &ghost, dec!(100), "");
        assert!(matches!(result, Err(LedgerError::RecipientNotFound { .. })));
        assert_eq!(engine.balance(a.number()).unwrap(), dec!(1000));
        assert_eq!(engine.transactions(a.number()).unwrap().len(), 1);
    }

    #[test]
    fn test_transfer_insufficient_funds_appends_no_rows() {
        let engine = engine();
        let a = open(&engine);
        let b = open(&engine);

        let result = engine.transfer(a.number(), b.number(), dec!(1000.01), "");
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(engine.transactions(a.number()).unwrap().len(), 1);
        assert_eq!(engine.transactions(b.number()).unwrap().len(), 1);
    }

    #[test]
    fn test_self_transfer_is_allowed_and_nets_zero() {
        let engine = engine();
        let a = open(&engine);

        engine.transfer(a.number(), a.number(), dec!(300), "").unwrap();
        assert_eq!(engine.balance(a.number()).unwrap(), dec!(1000));
        // Both legs exist on the same account.
        assert_eq!(engine.transactions(a.number()).unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_non_positive_and_over_precise_amounts() {
        let engine = engine();
        let account = open(&engine);

        for amount in [dec!(0), dec!(-5), dec!(1.005)] {
            assert!(matches!(
                engine.deposit(account.number(), amount, "bad"),
                Err(LedgerError::InvalidAmount { .. })
            ));
            assert!(matches!(
                engine.withdraw(account.number(), amount, "bad"),
                Err(LedgerError::InvalidAmount { .. })
            ));
        }
        assert_eq!(engine.transactions(account.number()).unwrap().len(), 1);
    }

    #[test]
    fn test_operations_on_unknown_account_fail() {
        let engine = engine();
        let ghost: AccountNumber = "123123123123".parse().unwrap();

        assert!(matches!(
            engine.deposit(&ghost, dec!(10), ""),
            Err(LedgerError::AccountNotFound { .. })
        ));
        assert!(matches!(
            engine.balance(&ghost),
            Err(LedgerError::AccountNotFound { .. })
        ));
    }

    #[test]
    fn test_update_profile_leaves_ledger_untouched() {
        let engine = engine();
        let account = open(&engine);

        let updated = engine
            .update_profile(
                account.number(),
                Profile {
                    username: Some("ada".into()),
                    ..Profile::default()
                },
            )
            .unwrap();
        assert_eq!(updated.profile().username.as_deref(), Some("ada"));
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(1000));
        assert_eq!(engine.transactions(account.number()).unwrap().len(), 1);
    }

    // A store double that reports a duplicate number for the first N opens,
    // to exercise the collision-retry contract.
    struct CollidingStore {
        inner: MemoryStore,
        failures: std::sync::atomic::AtomicU32,
    }

    impl LedgerStore for CollidingStore {
        fn create_account(
            &self,
            number: AccountNumber,
            kind: AccountKind,
            profile: Profile,
        ) -> Result<Account, StoreError> {
            use std::sync::atomic::Ordering;
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::DuplicateAccountNumber { number });
            }
            self.inner.create_account(number, kind, profile)
        }

        fn account_by_number(
            &self,
            number: &AccountNumber,
        ) -> Result<Option<Account>, StoreError> {
            self.inner.account_by_number(number)
        }

        fn account(&self, id: crate::engine::account::AccountId) -> Result<Option<Account>, StoreError> {
            self.inner.account(id)
        }

        fn update_profile(
            &self,
            id: crate::engine::account::AccountId,
            profile: Profile,
        ) -> Result<(), StoreError> {
            self.inner.update_profile(id, profile)
        }

        fn transactions(
            &self,
            account: crate::engine::account::AccountId,
        ) -> Result<Vec<Transaction>, StoreError> {
            self.inner.transactions(account)
        }

        fn append(&self, batch: Vec<NewTransaction>) -> Result<Vec<Transaction>, StoreError> {
            self.inner.append(batch)
        }

        fn accounts(&self) -> Result<Vec<Account>, StoreError> {
            self.inner.accounts()
        }
    }

    #[test]
    fn test_open_account_retries_number_collisions() {
        let store = CollidingStore {
            inner: MemoryStore::new(),
            failures: std::sync::atomic::AtomicU32::new(3),
        };
        let engine = LedgerEngine::new(store);

        let account = engine
            .open_account(AccountKind::Merchant, Profile::default())
            .unwrap();
        assert_eq!(engine.balance(account.number()).unwrap(), dec!(1000));
    }

    #[test]
    fn test_open_account_surfaces_exhausted_retry_budget() {
        let store = CollidingStore {
            inner: MemoryStore::new(),
            failures: std::sync::atomic::AtomicU32::new(u32::MAX),
        };
        let engine = LedgerEngine::new(store);

        let result = engine.open_account(AccountKind::Individual, Profile::default());
        assert!(matches!(
            result,
            Err(LedgerError::AccountNumbersExhausted { .. })
        ));
    }
}
