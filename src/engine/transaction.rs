use super::Decimal;
use super::account::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TransactionId = u64;

/// Classification of a ledger row. The kind alone decides whether the amount
/// counts towards or against the account's derived balance; amounts are
/// always stored positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Inflow: manual deposits, seed deposits and the receiving leg of a
    /// transfer.
    Deposit,
    /// Outflow: cash withdrawal.
    Withdrawal,
    /// Outflow: the sending leg of a peer transfer.
    Transfer,
    /// Outflow: third-party funding under a caller-supplied category label
    /// ("Betting Funding", "Data Purchase", ...).
    Funding(String),
}

impl TransactionKind {
    /// Whether this kind credits the account. Everything that is not a
    /// deposit debits it.
    pub fn is_inflow(&self) -> bool {
        matches!(self, TransactionKind::Deposit)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "Deposit"),
            TransactionKind::Withdrawal => write!(f, "Withdrawal"),
            TransactionKind::Transfer => write!(f, "Transfer"),
            TransactionKind::Funding(label) => f.write_str(label),
        }
    }
}

/// A row the engine wants appended but the store has not committed yet.
/// The store assigns the id and timestamp at commit time.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
}

/// A committed ledger row. Immutable: the log is append-only and corrections
/// are new offsetting rows, never edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    account: AccountId,
    kind: TransactionKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    description: String,
}

impl Transaction {
    pub(crate) fn commit(
        id: TransactionId,
        new: NewTransaction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account: new.account,
            kind: new.kind,
            amount: new.amount,
            timestamp,
            description: new.description,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Signed contribution of this row to its account's balance.
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_inflow() {
            self.amount
        } else {
            -self.amount
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] account={} tx={} amount={} \"{}\"",
            self.kind, self.account, self.id, self.amount, self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn committed(kind: TransactionKind, amount: Decimal) -> Transaction {
        Transaction::commit(
            1,
            NewTransaction {
                account: 9,
                kind,
                amount,
                description: "test".into(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_only_deposit_is_inflow() {
        assert!(TransactionKind::Deposit.is_inflow());
        assert!(!TransactionKind::Withdrawal.is_inflow());
        assert!(!TransactionKind::Transfer.is_inflow());
        assert!(!TransactionKind::Funding("Betting Funding".into()).is_inflow());
    }

    #[test]
    fn test_signed_amount_follows_kind() {
        assert_eq!(
            committed(TransactionKind::Deposit, dec!(25.50)).signed_amount(),
            dec!(25.50)
        );
        assert_eq!(
            committed(TransactionKind::Withdrawal, dec!(25.50)).signed_amount(),
            dec!(-25.50)
        );
        assert_eq!(
            committed(TransactionKind::Funding("Data Purchase".into()), dec!(10)).signed_amount(),
            dec!(-10)
        );
    }

    #[test]
    fn test_funding_displays_its_label() {
        let kind = TransactionKind::Funding("Betting Funding".into());
        assert_eq!(kind.to_string(), "Betting Funding");
        assert_eq!(TransactionKind::Transfer.to_string(), "Transfer");
    }
}
