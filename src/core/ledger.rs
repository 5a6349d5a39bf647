use crate::analytics::rate::derived_rate;
use crate::core::counterparty::CounterpartyId;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running balance of a single counterparty, derived from its transactions.
///
/// `net_local_due` follows the payable sign convention:
/// positive means we still owe the counterparty, negative means we have
/// paid in advance (a receivable from them).
///
/// Ledgers are never persisted; they are rebuilt from the transaction
/// streams on every computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyLedger {
    pub counterparty_id: CounterpartyId,
    /// Sum of `foreign_amount` over approved forex records.
    pub total_foreign_inflow: Decimal,
    /// Sum of `local_amount` over approved forex records.
    pub total_local_liability: Decimal,
    /// Sum of `local_amount` over all payments.
    pub total_local_paid: Decimal,
    /// `total_local_liability - total_local_paid`.
    pub net_local_due: Decimal,
    /// Liability-to-inflow ratio, or the configured fallback rate.
    pub effective_rate: Decimal,
    /// True when `effective_rate` is the fallback rather than a derived ratio.
    pub uses_fallback_rate: bool,
}

impl CounterpartyLedger {
    /// A zero ledger priced at the fallback rate.
    pub fn new(counterparty_id: CounterpartyId, fallback_rate: Decimal) -> Self {
        Self {
            counterparty_id,
            total_foreign_inflow: Decimal::ZERO,
            total_local_liability: Decimal::ZERO,
            total_local_paid: Decimal::ZERO,
            net_local_due: Decimal::ZERO,
            effective_rate: fallback_rate,
            uses_fallback_rate: true,
        }
    }

    /// Apply an approved forex inflow.
    pub(crate) fn record_inflow(&mut self, foreign_amount: Decimal, local_amount: Decimal) {
        self.total_foreign_inflow += foreign_amount;
        self.total_local_liability += local_amount;
        self.net_local_due = self.total_local_liability - self.total_local_paid;
    }

    /// Apply a payment settlement.
    pub(crate) fn record_payment(&mut self, local_amount: Decimal) {
        self.total_local_paid += local_amount;
        self.net_local_due = self.total_local_liability - self.total_local_paid;
    }

    /// Re-derive `effective_rate` from the accumulated totals.
    pub(crate) fn resolve_rate(&mut self, fallback_rate: Decimal) {
        match derived_rate(self) {
            Some(rate) => {
                self.effective_rate = rate;
                self.uses_fallback_rate = false;
            }
            None => {
                self.effective_rate = fallback_rate;
                self.uses_fallback_rate = true;
            }
        }
    }

    /// This counterparty's contribution to the portfolio's active float,
    /// in foreign-currency units. Negative for advances.
    ///
    /// Saturates at the `Decimal` bounds when a near-zero rate would push the
    /// quotient out of range.
    pub fn float_foreign(&self) -> Decimal {
        if self.effective_rate <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        match self.net_local_due.checked_div(self.effective_rate) {
            Some(float) => float,
            None => {
                warn!(
                    "float for {} overflows at rate {}, saturating",
                    self.counterparty_id, self.effective_rate
                );
                if self.net_local_due.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                }
            }
        }
    }

    /// True when we still owe this counterparty.
    pub fn is_payable(&self) -> bool {
        self.net_local_due > Decimal::ZERO
    }

    /// True when we have paid this counterparty in advance.
    pub fn is_advance(&self) -> bool {
        self.net_local_due < Decimal::ZERO
    }
}

/// The full set of counterparty ledgers produced by one aggregation pass.
///
/// Ordered by counterparty ID so repeated runs over the same input
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBook {
    ledgers: BTreeMap<CounterpartyId, CounterpartyLedger>,
    /// Number of malformed records skipped while building the book.
    skipped_records: usize,
    /// Fallback rate applied to ledgers without a usable inflow history.
    fallback_rate: Decimal,
}

impl LedgerBook {
    pub fn new(fallback_rate: Decimal) -> Self {
        Self {
            ledgers: BTreeMap::new(),
            skipped_records: 0,
            fallback_rate,
        }
    }

    /// Get or lazily materialize the ledger for `counterparty`.
    pub(crate) fn entry(&mut self, counterparty: &CounterpartyId) -> &mut CounterpartyLedger {
        let fallback_rate = self.fallback_rate;
        self.ledgers
            .entry(counterparty.clone())
            .or_insert_with(|| CounterpartyLedger::new(counterparty.clone(), fallback_rate))
    }

    pub(crate) fn mark_skipped(&mut self) {
        self.skipped_records += 1;
    }

    pub(crate) fn resolve_rates(&mut self) {
        let fallback_rate = self.fallback_rate;
        for ledger in self.ledgers.values_mut() {
            ledger.resolve_rate(fallback_rate);
        }
    }

    pub fn get(&self, counterparty: &CounterpartyId) -> Option<&CounterpartyLedger> {
        self.ledgers.get(counterparty)
    }

    pub fn contains(&self, counterparty: &CounterpartyId) -> bool {
        self.ledgers.contains_key(counterparty)
    }

    pub fn ledgers(&self) -> &BTreeMap<CounterpartyId, CounterpartyLedger> {
        &self.ledgers
    }

    pub fn iter(&self) -> impl Iterator<Item = &CounterpartyLedger> {
        self.ledgers.values()
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn fallback_rate(&self) -> Decimal {
        self.fallback_rate
    }

    pub fn into_ledgers(self) -> BTreeMap<CounterpartyId, CounterpartyLedger> {
        self.ledgers
    }
}
