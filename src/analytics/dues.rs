use crate::core::counterparty::Counterparty;
use crate::core::ledger::{CounterpartyLedger, LedgerBook};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A counterparty's ledger joined with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyDue {
    pub display_name: String,
    pub ledger: CounterpartyLedger,
}

/// Every counterparty with a non-zero net due, largest payable first.
///
/// Advances sort after payables. Names missing from `roster` fall back to
/// the counterparty ID.
pub fn counterparties_with_due(roster: &[Counterparty], book: &LedgerBook) -> Vec<CounterpartyDue> {
    let names: HashMap<_, _> = roster
        .iter()
        .map(|c| (&c.id, c.display_name.as_str()))
        .collect();

    let mut dues: Vec<CounterpartyDue> = book
        .iter()
        .filter(|ledger| !ledger.net_local_due.is_zero())
        .map(|ledger| CounterpartyDue {
            display_name: names
                .get(&ledger.counterparty_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| ledger.counterparty_id.to_string()),
            ledger: ledger.clone(),
        })
        .collect();

    dues.sort_by(|a, b| {
        b.ledger
            .net_local_due
            .cmp(&a.ledger.net_local_due)
            .then_with(|| a.ledger.counterparty_id.cmp(&b.ledger.counterparty_id))
    });
    dues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::build_ledgers;
    use crate::core::transaction::{ForexRecord, PaymentRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sorted_by_due_with_names() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let forex = vec![
            ForexRecord::approved("A", dec!(10), dec!(1200), day),
            ForexRecord::approved("B", dec!(50), dec!(6000), day),
            ForexRecord::approved("SETTLED", dec!(1), dec!(120), day),
        ];
        let payments = vec![
            PaymentRecord::new("SETTLED", dec!(120), day),
            PaymentRecord::new("ADV", dec!(300), day),
        ];
        let roster = vec![
            Counterparty::new("A", "Alpha Traders"),
            Counterparty::new("B", "Beta Imports"),
        ];

        let book = build_ledgers(&forex, &payments, dec!(120));
        let dues = counterparties_with_due(&roster, &book);

        let names: Vec<&str> = dues.iter().map(|d| d.display_name.as_str()).collect();
        assert_eq!(names, vec!["Beta Imports", "Alpha Traders", "ADV"]);
        assert_eq!(dues[2].ledger.net_local_due, dec!(-300));
    }
}
