//! The types that make up a user's ledger.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{auth::UserID, ledger::validation::ValidationError};

/// The ID the store assigned to a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A strictly positive amount of money, at most [Amount::MAX].
///
/// Whether it is money in or out is decided by the entry's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// The largest amount of a single entry, one quadrillion.
    ///
    /// Summing a month of entries this size stays far below `Decimal::MAX`.
    pub const MAX: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

    /// Wrap `value` if it is greater than zero and no more than [Amount::MAX].
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO && value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(text.trim())
            .ok()
            .and_then(Amount::new)
            .ok_or(ValidationError::InvalidAmount)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Stored as text so no precision is lost to floating point.
impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The ID of a row in the category type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(i64);

impl CategoryId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// How an entry counts towards the period totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
    /// The label is not one the app knows how to total.
    Unclassified,
}

/// Reference data classifying an entry, e.g. "Receita" or "Despesa".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryType {
    pub id: CategoryId,
    pub label: String,
}

impl CategoryType {
    /// Classify the label, ignoring case and surrounding whitespace.
    pub fn kind(&self) -> CategoryKind {
        match self.label.trim().to_lowercase().as_str() {
            "receita" | "income" => CategoryKind::Income,
            "despesa" | "expense" => CategoryKind::Expense,
            _ => CategoryKind::Unclassified,
        }
    }
}

/// Whether an entry has been settled, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid(Date),
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid(_))
    }

    pub fn paid_date(&self) -> Option<Date> {
        match self {
            PaymentStatus::Paid(date) => Some(*date),
            PaymentStatus::Pending => None,
        }
    }
}

/// One income or expense record owned by a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub owner_id: UserID,
    pub description: String,
    pub amount: Amount,
    pub category: CategoryType,
    pub posted_date: Date,
    pub payment: PaymentStatus,
}

/// A new entry that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub description: String,
    pub amount: Amount,
    pub category_id: CategoryId,
    pub posted_date: Date,
    pub payment: PaymentStatus,
}

/// The fields of an existing entry that may change.
///
/// The category and owner are fixed once an entry is created.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPatch {
    pub description: String,
    pub amount: Amount,
    pub posted_date: Date,
    pub payment: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::ledger::validation::ValidationError;

    use super::{Amount, CategoryId, CategoryKind, CategoryType, PaymentStatus};

    fn category(label: &str) -> CategoryType {
        CategoryType {
            id: CategoryId::new(1),
            label: label.to_owned(),
        }
    }

    #[test]
    fn classifies_labels_ignoring_case_and_whitespace() {
        assert_eq!(category("Receita").kind(), CategoryKind::Income);
        assert_eq!(category(" INCOME ").kind(), CategoryKind::Income);
        assert_eq!(category("despesa").kind(), CategoryKind::Expense);
        assert_eq!(category("Expense").kind(), CategoryKind::Expense);
        assert_eq!(category("Investimento").kind(), CategoryKind::Unclassified);
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(Amount::new(Decimal::ZERO).is_none());
        assert!(Amount::new(Decimal::new(-1, 0)).is_none());
        assert_eq!(
            Amount::new(Decimal::new(1, 2)).map(|amount| amount.value()),
            Some(Decimal::new(1, 2))
        );
    }

    #[test]
    fn amount_parses_trimmed_text() {
        assert_eq!(
            " 12.50 ".parse::<Amount>().map(|amount| amount.value()),
            Ok(Decimal::new(1250, 2))
        );
        assert_eq!("abc".parse::<Amount>(), Err(ValidationError::InvalidAmount));
        assert_eq!("0.00".parse::<Amount>(), Err(ValidationError::InvalidAmount));
    }

    #[test]
    fn amount_is_capped() {
        assert_eq!(Amount::MAX, Decimal::new(1_000_000_000_000_000, 0));
        assert_eq!(
            "1000000000000000".parse::<Amount>().map(|amount| amount.value()),
            Ok(Amount::MAX)
        );
        assert_eq!(
            "1000000000000000.01".parse::<Amount>(),
            Err(ValidationError::InvalidAmount)
        );
        assert_eq!(
            Decimal::MAX.to_string().parse::<Amount>(),
            Err(ValidationError::InvalidAmount)
        );
    }

    #[test]
    fn payment_status_flattens_to_pair() {
        let paid = PaymentStatus::Paid(date!(2026 - 02 - 10));

        assert!(paid.is_paid());
        assert_eq!(paid.paid_date(), Some(date!(2026 - 02 - 10)));
        assert!(!PaymentStatus::Pending.is_paid());
        assert_eq!(PaymentStatus::Pending.paid_date(), None);
    }
}
