use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a counterparty (supplier or contact).
///
/// Counterparties own forex inflows and receive supplier payments.
/// Balances are never stored on the counterparty itself; they are
/// derived from transactions by the ledger aggregator.
///
/// # Examples
///
/// ```
/// use reconciliation_engine::core::counterparty::CounterpartyId;
///
/// let acme = CounterpartyId::new("SUP-ACME");
/// let globex = CounterpartyId::new("SUP-GLOBEX");
/// assert_ne!(acme, globex);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyId(String);

impl CounterpartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this counterparty ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CounterpartyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A supplier/contact entity as returned by the roster query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: CounterpartyId,
    pub display_name: String,
}

impl Counterparty {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: CounterpartyId::new(id),
            display_name: display_name.into(),
        }
    }
}
