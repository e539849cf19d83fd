//! Checks the ledger entry form before anything is sent to the store.
//!
//! Every field is checked and at most one error is kept per field, so the
//! form can show all problems at once.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::ledger::core::{
    Amount, CategoryId, CategoryType, EntryPatch, PaymentStatus, ValidatedEntry,
};

/// Dates are entered as ISO 8601 calendar dates by `<input type="date">`.
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A problem with one field of the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("This field is required.")]
    EmptyField,
    #[error("Enter an amount greater than zero and at most 1000000000000000.")]
    InvalidAmount,
    #[error("Choose a category.")]
    MissingCategory,
    #[error("Enter a date.")]
    MissingDate,
    #[error("Enter the date this entry was paid.")]
    MissingPaidDate,
    #[error("Enter a valid date.")]
    InvalidDate,
}

/// The errors found in an entry form, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub description: Option<ValidationError>,
    pub amount: Option<ValidationError>,
    pub category: Option<ValidationError>,
    pub posted_date: Option<ValidationError>,
    pub paid_date: Option<ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.posted_date.is_none()
            && self.paid_date.is_none()
    }
}

/// The entry form exactly as the browser posted it.
///
/// Missing fields default to empty so that they are reported as field
/// errors rather than rejected by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryForm {
    pub description: String,
    pub amount: String,
    pub category_id: String,
    pub posted_date: String,
    /// Checkbox value, `Some` means checked regardless of the string.
    pub paid: Option<String>,
    pub paid_date: String,
}

fn validate_description(raw: &str) -> Result<String, ValidationError> {
    let description = raw.trim();

    if description.is_empty() {
        Err(ValidationError::EmptyField)
    } else {
        Ok(description.to_owned())
    }
}

/// Accepts `.` or a single `,` as the decimal separator.
fn validate_amount(raw: &str) -> Result<Amount, ValidationError> {
    let raw = raw.trim();

    if raw.matches(',').count() == 1 && !raw.contains('.') {
        raw.replace(',', ".").parse()
    } else {
        raw.parse()
    }
}

fn validate_category(
    raw: &str,
    categories: &[CategoryType],
) -> Result<CategoryId, ValidationError> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::MissingCategory)?;

    categories
        .iter()
        .find(|category| category.id.as_i64() == id)
        .map(|category| category.id)
        .ok_or(ValidationError::MissingCategory)
}

fn parse_date(raw: &str, missing: ValidationError) -> Result<Date, ValidationError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(missing);
    }

    Date::parse(raw, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate)
}

fn validate_payment(form: &EntryForm) -> Result<PaymentStatus, ValidationError> {
    if form.paid.is_none() {
        return Ok(PaymentStatus::Pending);
    }

    parse_date(&form.paid_date, ValidationError::MissingPaidDate).map(PaymentStatus::Paid)
}

/// Record the error for a field, or hand back the valid value.
fn check<T>(result: Result<T, ValidationError>, slot: &mut Option<ValidationError>) -> Option<T> {
    result.map_err(|error| *slot = Some(error)).ok()
}

/// Validate the new entry form against the known `categories`.
///
/// # Errors
///
/// Returns every field that failed validation.
pub fn validate_new_entry(
    form: &EntryForm,
    categories: &[CategoryType],
) -> Result<ValidatedEntry, FieldErrors> {
    let mut errors = FieldErrors::default();

    let description = check(validate_description(&form.description), &mut errors.description);
    let amount = check(validate_amount(&form.amount), &mut errors.amount);
    let category_id = check(
        validate_category(&form.category_id, categories),
        &mut errors.category,
    );
    let posted_date = check(
        parse_date(&form.posted_date, ValidationError::MissingDate),
        &mut errors.posted_date,
    );
    let payment = check(validate_payment(form), &mut errors.paid_date);

    match (description, amount, category_id, posted_date, payment) {
        (Some(description), Some(amount), Some(category_id), Some(posted_date), Some(payment)) => {
            Ok(ValidatedEntry {
                description,
                amount,
                category_id,
                posted_date,
                payment,
            })
        }
        _ => Err(errors),
    }
}

/// Validate the edit form. The category cannot be changed, so it is not checked.
///
/// # Errors
///
/// Returns every field that failed validation.
pub fn validate_entry_patch(form: &EntryForm) -> Result<EntryPatch, FieldErrors> {
    let mut errors = FieldErrors::default();

    let description = check(validate_description(&form.description), &mut errors.description);
    let amount = check(validate_amount(&form.amount), &mut errors.amount);
    let posted_date = check(
        parse_date(&form.posted_date, ValidationError::MissingDate),
        &mut errors.posted_date,
    );
    let payment = check(validate_payment(form), &mut errors.paid_date);

    match (description, amount, posted_date, payment) {
        (Some(description), Some(amount), Some(posted_date), Some(payment)) => Ok(EntryPatch {
            description,
            amount,
            posted_date,
            payment,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::ledger::core::{CategoryId, CategoryType, PaymentStatus};

    use super::{
        EntryForm, FieldErrors, ValidationError, validate_entry_patch, validate_new_entry,
    };

    fn categories() -> Vec<CategoryType> {
        vec![
            CategoryType {
                id: CategoryId::new(1),
                label: "Receita".to_owned(),
            },
            CategoryType {
                id: CategoryId::new(2),
                label: "Despesa".to_owned(),
            },
        ]
    }

    fn valid_form() -> EntryForm {
        EntryForm {
            description: "Salário".to_owned(),
            amount: "3500.00".to_owned(),
            category_id: "1".to_owned(),
            posted_date: "2026-02-05".to_owned(),
            paid: None,
            paid_date: String::new(),
        }
    }

    #[test]
    fn valid_form_passes() {
        let entry = validate_new_entry(&valid_form(), &categories()).unwrap();

        assert_eq!(entry.description, "Salário");
        assert_eq!(entry.amount.value(), Decimal::new(350000, 2));
        assert_eq!(entry.category_id, CategoryId::new(1));
        assert_eq!(entry.posted_date, date!(2026 - 02 - 05));
        assert_eq!(entry.payment, PaymentStatus::Pending);
    }

    #[test]
    fn description_is_trimmed() {
        let form = EntryForm {
            description: "  Aluguel  ".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            validate_new_entry(&form, &categories()).unwrap().description,
            "Aluguel"
        );
    }

    #[test]
    fn unpaid_entry_never_needs_paid_date() {
        let form = EntryForm {
            paid: None,
            paid_date: "not a date".to_owned(),
            ..valid_form()
        };

        let entry = validate_new_entry(&form, &categories()).unwrap();

        assert_eq!(entry.payment, PaymentStatus::Pending);
    }

    #[test]
    fn paid_entry_needs_paid_date() {
        let form = EntryForm {
            paid: Some("on".to_owned()),
            paid_date: "  ".to_owned(),
            ..valid_form()
        };

        let errors = validate_new_entry(&form, &categories()).unwrap_err();

        assert_eq!(
            errors,
            FieldErrors {
                paid_date: Some(ValidationError::MissingPaidDate),
                ..Default::default()
            }
        );
    }

    #[test]
    fn paid_entry_keeps_paid_date() {
        let form = EntryForm {
            paid: Some("on".to_owned()),
            paid_date: "2026-02-07".to_owned(),
            ..valid_form()
        };

        let entry = validate_new_entry(&form, &categories()).unwrap();

        assert_eq!(entry.payment, PaymentStatus::Paid(date!(2026 - 02 - 07)));
    }

    #[test]
    fn positive_amounts_parse_to_same_value() {
        let cases = [
            ("0.01", Decimal::new(1, 2)),
            ("10", Decimal::new(10, 0)),
            ("1234.5678", Decimal::new(12345678, 4)),
            (" 42.10 ", Decimal::new(4210, 2)),
            ("42,10", Decimal::new(4210, 2)),
        ];

        for (raw, want) in cases {
            let form = EntryForm {
                amount: raw.to_owned(),
                ..valid_form()
            };

            let entry = validate_new_entry(&form, &categories())
                .unwrap_or_else(|errors| panic!("{raw:?} should be valid, got {errors:?}"));
            assert_eq!(entry.amount.value(), want, "amount {raw:?}");
        }
    }

    #[test]
    fn non_positive_or_garbage_amounts_are_invalid() {
        for raw in [
            "0",
            "0.00",
            "-5",
            "",
            "abc",
            "1,000.50",
            "1,2,3",
            "1000000000000000.01",
            "79228162514264337593543950335",
        ] {
            let form = EntryForm {
                amount: raw.to_owned(),
                ..valid_form()
            };

            let errors = validate_new_entry(&form, &categories()).unwrap_err();
            assert_eq!(
                errors.amount,
                Some(ValidationError::InvalidAmount),
                "amount {raw:?}"
            );
        }
    }

    #[test]
    fn unknown_category_is_missing() {
        for raw in ["", "abc", "99"] {
            let form = EntryForm {
                category_id: raw.to_owned(),
                ..valid_form()
            };

            let errors = validate_new_entry(&form, &categories()).unwrap_err();
            assert_eq!(errors.category, Some(ValidationError::MissingCategory));
        }
    }

    #[test]
    fn dates_must_be_present_and_iso() {
        let blank = EntryForm {
            posted_date: String::new(),
            ..valid_form()
        };
        let malformed = EntryForm {
            posted_date: "05/02/2026".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            validate_new_entry(&blank, &categories())
                .unwrap_err()
                .posted_date,
            Some(ValidationError::MissingDate)
        );
        assert_eq!(
            validate_new_entry(&malformed, &categories())
                .unwrap_err()
                .posted_date,
            Some(ValidationError::InvalidDate)
        );
    }

    #[test]
    fn all_errors_are_collected() {
        let form = EntryForm {
            paid: Some("on".to_owned()),
            ..EntryForm::default()
        };

        let errors = validate_new_entry(&form, &categories()).unwrap_err();

        assert_eq!(
            errors,
            FieldErrors {
                description: Some(ValidationError::EmptyField),
                amount: Some(ValidationError::InvalidAmount),
                category: Some(ValidationError::MissingCategory),
                posted_date: Some(ValidationError::MissingDate),
                paid_date: Some(ValidationError::MissingPaidDate),
            }
        );
    }

    #[test]
    fn patch_ignores_category() {
        let form = EntryForm {
            category_id: String::new(),
            ..valid_form()
        };

        let patch = validate_entry_patch(&form).unwrap();

        assert_eq!(patch.description, "Salário");
        assert_eq!(patch.posted_date, date!(2026 - 02 - 05));
    }

    #[test]
    fn patch_reports_field_errors() {
        let form = EntryForm {
            description: " ".to_owned(),
            amount: "-1".to_owned(),
            ..valid_form()
        };

        let errors = validate_entry_patch(&form).unwrap_err();

        assert_eq!(errors.description, Some(ValidationError::EmptyField));
        assert_eq!(errors.amount, Some(ValidationError::InvalidAmount));
        assert_eq!(errors.category, None);
    }
}
