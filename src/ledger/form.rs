//! The entry form shared by the new and edit entry pages.
//!
//! The fields are rendered without the enclosing `<form>` so that a failed
//! submission can swap them back into the same form with the field errors.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, TextInput, loading_spinner,
    },
    ledger::{
        core::{CategoryType, EntryId, LedgerEntry},
        validation::{EntryForm, FieldErrors, ValidationError},
    },
};

/// Whether the form creates a new entry or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntryId),
}

impl FormMode {
    fn submit_label(self) -> &'static str {
        match self {
            FormMode::Create => "Create entry",
            FormMode::Edit(_) => "Save changes",
        }
    }
}

fn error_text(error: Option<ValidationError>) -> Option<String> {
    error.map(|error| error.to_string())
}

/// The whole form element, including the fields.
pub fn entry_form(
    mode: FormMode,
    form: &EntryForm,
    errors: &FieldErrors,
    categories: &[CategoryType],
) -> Markup {
    let fields = entry_form_fields(mode, form, errors, categories);

    match mode {
        FormMode::Create => html! {
            form
                id="entry-form"
                hx-post=(endpoints::ENTRIES_API)
                "hx-target-422"="this"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)
            }
        },
        FormMode::Edit(entry_id) => html! {
            form
                id="entry-form"
                hx-put=(format_endpoint(endpoints::ENTRY_API, entry_id.as_i64()))
                "hx-target-422"="this"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)
            }
        },
    }
}

/// The inputs of the entry form, each followed by its error message if any.
///
/// The category cannot be changed once an entry exists, so in
/// [FormMode::Edit] the select is disabled and its value is sent in a hidden
/// input instead.
pub fn entry_form_fields(
    mode: FormMode,
    form: &EntryForm,
    errors: &FieldErrors,
    categories: &[CategoryType],
) -> Markup {
    let is_edit = matches!(mode, FormMode::Edit(_));
    let amount_error = error_text(errors.amount);
    let category_error = error_text(errors.category);
    let description_error = error_text(errors.description);
    let posted_date_error = error_text(errors.posted_date);
    let paid_date_error = error_text(errors.paid_date);
    let is_paid = form.paid.is_some();

    html! {
        (TextInput {
            label: "Description",
            name: "description",
            id: "description",
            type_: "text",
            value: &form.description,
            placeholder: "Conta de luz",
            required: true,
            autofocus: !is_edit,
            error_message: description_error.as_deref(),
        }.into_html())

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="text"
                    inputmode="decimal"
                    placeholder="0.00"
                    value=(form.amount)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error) = &amount_error {
                p id="amount-error" class=(FORM_ERROR_STYLE) { (error) }
            }
        }

        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            select
                name="category_id"
                id="category_id"
                required
                disabled[is_edit]
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Choose a category" }

                @for category in categories {
                    @let value = category.id.as_i64().to_string();
                    option value=(value) selected[value == form.category_id.trim()]
                    {
                        (category.label)
                    }
                }
            }

            @if is_edit {
                input type="hidden" name="category_id" value=(form.category_id);
            }

            @if let Some(error) = &category_error {
                p id="category_id-error" class=(FORM_ERROR_STYLE) { (error) }
            }
        }

        (TextInput {
            label: "Date",
            name: "posted_date",
            id: "posted_date",
            type_: "date",
            value: &form.posted_date,
            placeholder: "",
            required: true,
            autofocus: false,
            error_message: posted_date_error.as_deref(),
        }.into_html())

        div class="flex items-center gap-x-3"
        {
            input
                type="checkbox"
                name="paid"
                id="paid"
                value="true"
                checked[is_paid]
                class="rounded-xs";

            label for="paid" class="block text-sm font-medium text-gray-900 dark:text-white"
            {
                "Paid"
            }
        }

        (TextInput {
            label: "Paid on",
            name: "paid_date",
            id: "paid_date",
            type_: "date",
            value: &form.paid_date,
            placeholder: "",
            required: false,
            autofocus: false,
            error_message: paid_date_error.as_deref(),
        }.into_html())

        button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
        {
            span class="inline htmx-indicator" id="indicator"
            {
                (loading_spinner())
            }
            (mode.submit_label())
        }

        p class="text-sm text-center"
        {
            a href=(endpoints::DASHBOARD_VIEW) class=(LINK_STYLE) { "Cancel" }
        }
    }
}

/// Fill the form with the current values of `entry`.
pub fn form_from_entry(entry: &LedgerEntry) -> EntryForm {
    EntryForm {
        description: entry.description.clone(),
        amount: entry.amount.to_string(),
        category_id: entry.category.id.as_i64().to_string(),
        posted_date: entry.posted_date.to_string(),
        paid: entry.payment.is_paid().then(|| "true".to_owned()),
        paid_date: entry
            .payment
            .paid_date()
            .map(|date| date.to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        auth::UserID,
        endpoints,
        ledger::{
            core::{Amount, CategoryId, CategoryType, EntryId, LedgerEntry, PaymentStatus},
            validation::{EntryForm, FieldErrors, ValidationError},
        },
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, field_error, must_get_form,
        },
    };

    use super::{FormMode, entry_form, form_from_entry};

    fn categories() -> Vec<CategoryType> {
        vec![
            CategoryType {
                id: CategoryId::new(2),
                label: "Despesa".to_owned(),
            },
            CategoryType {
                id: CategoryId::new(1),
                label: "Receita".to_owned(),
            },
        ]
    }

    fn render(mode: FormMode, form: &EntryForm, errors: &FieldErrors) -> Html {
        Html::parse_fragment(&entry_form(mode, form, errors, &categories()).into_string())
    }

    fn paid_entry() -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new(3),
            owner_id: UserID::new(1),
            description: "Aluguel".to_owned(),
            amount: Amount::new(Decimal::new(120050, 2)).unwrap(),
            category: CategoryType {
                id: CategoryId::new(2),
                label: "Despesa".to_owned(),
            },
            posted_date: date!(2026 - 03 - 05),
            payment: PaymentStatus::Paid(date!(2026 - 03 - 06)),
        }
    }

    #[test]
    fn create_form_posts_to_entries_api() {
        let html = render(FormMode::Create, &EntryForm::default(), &FieldErrors::default());
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::ENTRIES_API, "hx-post");
        assert_hx_endpoint(&form, "this", "hx-target-422");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "amount", "text");
        assert_form_input(&form, "posted_date", "date");
        assert_form_submit_button(&form);
    }

    #[test]
    fn edit_form_puts_to_entry_api_with_values() {
        let entry = paid_entry();
        let html = render(
            FormMode::Edit(entry.id),
            &form_from_entry(&entry),
            &FieldErrors::default(),
        );
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/entries/3", "hx-put");
        assert_form_input_with_value(&form, "description", "text", "Aluguel");
        assert_form_input_with_value(&form, "amount", "text", "1200.50");
        assert_form_input_with_value(&form, "posted_date", "date", "2026-03-05");
        assert_form_input_with_value(&form, "paid_date", "date", "2026-03-06");
        assert_form_input_with_value(&form, "category_id", "hidden", "2");

        let paid = html
            .select(&Selector::parse("input#paid").unwrap())
            .next()
            .expect("No paid checkbox");
        assert!(paid.value().attr("checked").is_some());
    }

    #[test]
    fn edit_form_locks_category() {
        let entry = paid_entry();
        let html = render(
            FormMode::Edit(entry.id),
            &form_from_entry(&entry),
            &FieldErrors::default(),
        );

        let select = html
            .select(&Selector::parse("select#category_id").unwrap())
            .next()
            .expect("No category select");
        assert!(select.value().attr("disabled").is_some());

        let selected = html
            .select(&Selector::parse("option[selected]").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(selected, vec!["Despesa"]);
    }

    #[test]
    fn create_form_leaves_category_editable() {
        let html = render(FormMode::Create, &EntryForm::default(), &FieldErrors::default());

        let select = html
            .select(&Selector::parse("select#category_id").unwrap())
            .next()
            .expect("No category select");
        assert!(select.value().attr("disabled").is_none());
        assert!(
            html.select(&Selector::parse("input[type=hidden]").unwrap())
                .next()
                .is_none()
        );
    }

    #[test]
    fn shows_error_under_each_invalid_field() {
        let errors = FieldErrors {
            description: Some(ValidationError::EmptyField),
            amount: Some(ValidationError::InvalidAmount),
            category: Some(ValidationError::MissingCategory),
            posted_date: Some(ValidationError::MissingDate),
            paid_date: Some(ValidationError::MissingPaidDate),
        };

        let html = render(FormMode::Create, &EntryForm::default(), &errors);

        assert_eq!(
            field_error(&html, "description").as_deref(),
            Some("This field is required.")
        );
        assert_eq!(
            field_error(&html, "amount").as_deref(),
            Some("Enter an amount greater than zero and at most 1000000000000000.")
        );
        assert_eq!(
            field_error(&html, "category_id").as_deref(),
            Some("Choose a category.")
        );
        assert_eq!(
            field_error(&html, "posted_date").as_deref(),
            Some("Enter a date.")
        );
        assert_eq!(
            field_error(&html, "paid_date").as_deref(),
            Some("Enter the date this entry was paid.")
        );
    }

    #[test]
    fn valid_form_has_no_errors() {
        let html = render(FormMode::Create, &EntryForm::default(), &FieldErrors::default());

        for field in ["description", "amount", "category_id", "posted_date", "paid_date"] {
            assert_eq!(field_error(&html, field), None, "unexpected error for {field}");
        }
    }

    #[test]
    fn pending_entry_has_empty_paid_date() {
        let mut entry = paid_entry();
        entry.payment = PaymentStatus::Pending;

        let form = form_from_entry(&entry);

        assert_eq!(form.paid, None);
        assert_eq!(form.paid_date, "");
    }
}
