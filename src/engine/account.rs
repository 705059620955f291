use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type AccountId = u64;

/// Error returned when a string is not a well-formed account number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("account number must be exactly 12 digits")]
pub struct InvalidAccountNumber;

/// Opaque 12-digit account number, unique across the ledger and immutable
/// once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    pub const LEN: usize = 12;

    /// Draw a fresh candidate number. Uniqueness is the store's job; the
    /// engine retries on collision.
    pub(crate) fn generate<R: Rng>(rng: &mut R) -> Self {
        // First digit is never zero: numbers are issued from the
        // 100000000000..=999999999999 space.
        Self(rng.gen_range(100_000_000_000u64..=999_999_999_999).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountNumber {
    type Err = InvalidAccountNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidAccountNumber)
        }
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = InvalidAccountNumber;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which flavour of account this is. Only affects which profile fields are
/// populated; the ledger math is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Individual,
    Merchant,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Individual => write!(f, "individual"),
            AccountKind::Merchant => write!(f, "merchant"),
        }
    }
}

/// Identity metadata captured at account opening. The ledger treats every
/// field as opaque: nothing here participates in balance derivation, and the
/// engine passes it through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub bvn: Option<String>,
    pub company_name: Option<String>,
}

/// An account as recorded by the store.
///
/// Accounts are created once at opening and never deleted. The number and
/// kind are immutable; only the opaque profile may be replaced afterwards,
/// and only via the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    number: AccountNumber,
    kind: AccountKind,
    profile: Profile,
    opened_at: DateTime<Utc>,
}

impl Account {
    pub(crate) fn new(
        id: AccountId,
        number: AccountNumber,
        kind: AccountKind,
        profile: Profile,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            number,
            kind,
            profile,
            opened_at,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn number(&self) -> &AccountNumber {
        &self.number
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub(crate) fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }
}
