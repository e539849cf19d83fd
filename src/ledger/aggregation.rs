//! Monthly totals for the dashboard.

use rust_decimal::Decimal;

use crate::ledger::core::{CategoryKind, EntryId, LedgerEntry};

/// An entry whose category label is neither income nor expense.
///
/// These are left out of both totals and shown to the user instead.
#[derive(Debug, Clone, PartialEq)]
pub struct UnclassifiedEntry {
    pub entry_id: EntryId,
    pub label: String,
    pub amount: Decimal,
}

/// Income, expenses and balance of the entries in one period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodAggregate {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// `total_income - total_expense`, may be negative.
    pub balance: Decimal,
    pub unclassified: Vec<UnclassifiedEntry>,
}

/// Total `entries` by category in a single pass.
///
/// Decimal addition is exact, so the result does not depend on the order
/// of `entries`. Unclassified entries are listed in the order given.
pub fn aggregate(entries: &[LedgerEntry]) -> PeriodAggregate {
    let mut result = PeriodAggregate::default();

    for entry in entries {
        let amount = entry.amount.value();

        match entry.category.kind() {
            CategoryKind::Income => result.total_income += amount,
            CategoryKind::Expense => result.total_expense += amount,
            CategoryKind::Unclassified => {
                tracing::warn!(
                    "Entry {} has unknown category \"{}\" and was left out of the totals",
                    entry.id,
                    entry.category.label
                );
                result.unclassified.push(UnclassifiedEntry {
                    entry_id: entry.id,
                    label: entry.category.label.clone(),
                    amount,
                });
            }
        }
    }

    result.balance = result.total_income - result.total_expense;

    result
}
