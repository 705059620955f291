use super::Decimal;
use serde::Deserialize;

/// Tunables for the ledger engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Amount of the seed deposit appended when an account is opened.
    pub welcome_amount: Decimal,
    /// Description recorded on the seed deposit.
    pub welcome_description: String,
    /// How many fresh account numbers to try before giving up on a
    /// collision streak. With a 12-digit space this should never be hit.
    pub number_retry_budget: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            welcome_amount: Decimal::new(1000, 0),
            welcome_description: "Welcome bonus".to_owned(),
            number_retry_budget: 5,
        }
    }
}
