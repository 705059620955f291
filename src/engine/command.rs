use serde::Deserialize;

use super::account::AccountKind;
use super::error::CommandError;
use super::Decimal;

/// Raw command record as parsed from CSV input.
/// This is the unvalidated form that needs conversion to a [`Command`].
#[derive(Debug, Deserialize, Clone)]
pub struct CommandRecord {
    pub op: CommandOp,
    /// Account handle or raw 12-digit number this command acts on.
    /// For `open`, the handle the new account is bound to.
    pub account: String,
    /// Transfer recipient (handle or number); unused otherwise.
    pub counterparty: Option<String>,
    /// Account kind for `open`, category label for `fund`; unused otherwise.
    pub kind: Option<String>,
    /// Required for every op except `open`.
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

impl std::fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (account: {}", self.op, self.account)?;
        if let Some(counterparty) = &self.counterparty {
            write!(f, ", counterparty: {counterparty}")?;
        }
        if let Some(kind) = &self.kind {
            write!(f, ", kind: {kind}")?;
        }
        if let Some(amount) = self.amount {
            write!(f, ", amount: {amount}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandOp {
    Open,
    Deposit,
    Withdraw,
    Transfer,
    Fund,
}

impl std::fmt::Display for CommandOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandOp::Open => write!(f, "open"),
            CommandOp::Deposit => write!(f, "deposit"),
            CommandOp::Withdraw => write!(f, "withdraw"),
            CommandOp::Transfer => write!(f, "transfer"),
            CommandOp::Fund => write!(f, "fund"),
        }
    }
}

/// A validated command ready for the batch runner.
#[derive(Debug, Clone)]
pub enum Command {
    Open {
        handle: String,
        kind: AccountKind,
    },
    Deposit {
        account: String,
        amount: Decimal,
        description: String,
    },
    Withdraw {
        account: String,
        amount: Decimal,
        description: String,
    },
    Transfer {
        sender: String,
        recipient: String,
        amount: Decimal,
        description: String,
    },
    Fund {
        account: String,
        category: String,
        amount: Decimal,
        description: String,
    },
}

fn valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount.scale() <= 2
}

impl TryFrom<CommandRecord> for Command {
    type Error = CommandError;

    fn try_from(record: CommandRecord) -> Result<Self, Self::Error> {
        match record {
            CommandRecord {
                op: CommandOp::Open,
                account,
                kind: Some(kind),
                ..
            } if !account.is_empty() && (kind == "individual" || kind == "merchant") => {
                Ok(Command::Open {
                    handle: account,
                    kind: if kind == "individual" {
                        AccountKind::Individual
                    } else {
                        AccountKind::Merchant
                    },
                })
            }
            CommandRecord {
                op: CommandOp::Deposit,
                account,
                amount: Some(amount),
                description,
                ..
            } if valid_amount(amount) => Ok(Command::Deposit {
                account,
                amount,
                description: description.unwrap_or_else(|| "Manual deposit".to_owned()),
            }),
            CommandRecord {
                op: CommandOp::Withdraw,
                account,
                amount: Some(amount),
                description,
                ..
            } if valid_amount(amount) => Ok(Command::Withdraw {
                account,
                amount,
                description: description.unwrap_or_else(|| "Cash withdrawal".to_owned()),
            }),
            CommandRecord {
                op: CommandOp::Transfer,
                account,
                counterparty: Some(recipient),
                amount: Some(amount),
                description,
                ..
            } if valid_amount(amount) && !recipient.is_empty() => Ok(Command::Transfer {
                sender: account,
                recipient,
                amount,
                description: description.unwrap_or_default(),
            }),
            CommandRecord {
                op: CommandOp::Fund,
                account,
                kind: Some(category),
                amount: Some(amount),
                description,
                ..
            } if valid_amount(amount) && !category.is_empty() => Ok(Command::Fund {
                account,
                category,
                amount,
                description: description.unwrap_or_default(),
            }),
            record => Err(CommandError::InvalidCommand(record)),
        }
    }
}
