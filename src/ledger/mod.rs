//! Ledger entries and everything built on them:
//! - The entry model and the rules for validating submitted forms
//! - The owner-scoped store and the monthly totals
//! - The lifecycle controller that the pages and endpoints go through

mod aggregation;
mod core;
mod create;
mod dashboard_page;
mod delete;
mod edit;
mod form;
mod lifecycle;
mod period;
mod state;
mod store;
mod validation;

pub use aggregation::{PeriodAggregate, UnclassifiedEntry, aggregate};
pub use core::{
    Amount, CategoryId, CategoryKind, CategoryType, EntryId, EntryPatch, LedgerEntry,
    PaymentStatus, ValidatedEntry,
};
pub use create::{create_entry_endpoint, get_new_entry_page};
pub use dashboard_page::get_dashboard_page;
pub use delete::{delete_entry_endpoint, get_delete_entry_dialog};
pub use edit::{get_edit_entry_page, update_entry_endpoint};
pub use lifecycle::{EntryLifecycle, PendingDelete, PeriodView, SubmitFailure, SubmitState};
pub use period::{Period, PeriodQuery, dashboard_url};
pub use state::LedgerState;
pub use store::{LedgerStore, SQLiteLedgerStore, create_ledger_tables};
pub use validation::{EntryForm, FieldErrors, ValidationError};
