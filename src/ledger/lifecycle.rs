//! Mediates every change to a user's ledger.
//!
//! Each submission is validated, persisted and then reconciled with the
//! locally held view of the period, so the caller can render fresh totals
//! without guessing what the store did.

use crate::{
    Error,
    auth::UserID,
    ledger::{
        aggregation::{PeriodAggregate, aggregate},
        core::{EntryId, LedgerEntry},
        period::Period,
        store::LedgerStore,
        validation::{EntryForm, FieldErrors, validate_entry_patch, validate_new_entry},
    },
};

/// The entries of one period and their totals, as last seen by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodView {
    pub period: Period,
    pub entries: Vec<LedgerEntry>,
    pub aggregate: PeriodAggregate,
}

impl PeriodView {
    fn new(period: Period, entries: Vec<LedgerEntry>) -> Self {
        let aggregate = aggregate(&entries);

        Self {
            period,
            entries,
            aggregate,
        }
    }

    /// A period with no entries, shown when the store could not be read.
    pub fn empty(period: Period) -> Self {
        Self::new(period, Vec::new())
    }
}

/// Why a submission did not go through.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitFailure {
    /// The form had invalid fields. The store was not called.
    Validation(FieldErrors),
    /// The store refused or could not be reached.
    Store(Error),
}

/// Where the latest submission got to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Persisting,
    Success,
    Failed(SubmitFailure),
}

/// Proof that the user asked to delete an entry present in the view.
///
/// Pass it to [EntryLifecycle::confirm_delete] to delete the entry, or drop
/// it to cancel.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a pending delete cancels it"]
pub struct PendingDelete {
    entry_id: EntryId,
}

impl PendingDelete {
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }
}

/// Validates, persists and reconciles changes to one owner's ledger.
#[derive(Debug)]
pub struct EntryLifecycle<S> {
    store: S,
    owner_id: UserID,
    view: Option<PeriodView>,
    state: SubmitState,
}

impl<S: LedgerStore> EntryLifecycle<S> {
    /// A controller for `owner_id` with no period loaded yet.
    pub fn new(store: S, owner_id: UserID) -> Self {
        Self {
            store,
            owner_id,
            view: None,
            state: SubmitState::Idle,
        }
    }

    /// The state the latest submission ended in.
    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    /// The currently loaded period, if any.
    pub fn view(&self) -> Option<&PeriodView> {
        self.view.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn transition(&mut self, state: SubmitState) {
        tracing::debug!("Entry lifecycle for user {}: {state:?}", self.owner_id);
        self.state = state;
    }

    fn fail(&mut self, failure: SubmitFailure) -> SubmitFailure {
        self.transition(SubmitState::Failed(failure.clone()));
        failure
    }

    /// Load the entries of `period` into the view.
    ///
    /// # Errors
    ///
    /// If the store cannot be read the view is set to an empty period and
    /// [Error::StoreUnavailable] is returned so the caller can tell the user.
    pub fn load_period(&mut self, period: Period) -> Result<&PeriodView, Error> {
        match self.store.list_for_period(self.owner_id, period) {
            Ok(entries) => Ok(&*self.view.insert(PeriodView::new(period, entries))),
            Err(error) => {
                tracing::error!("Could not load {period} for user {}: {error}", self.owner_id);
                self.view = Some(PeriodView::empty(period));
                Err(error)
            }
        }
    }

    /// Re-query the loaded period after a successful write.
    fn refresh(&mut self) {
        let Some(period) = self.view.as_ref().map(|view| view.period) else {
            return;
        };

        match self.store.list_for_period(self.owner_id, period) {
            Ok(entries) => self.view = Some(PeriodView::new(period, entries)),
            Err(error) => {
                tracing::warn!("Saved the entry but could not refresh {period}: {error}");
            }
        }
    }

    /// Validate and store a new entry.
    ///
    /// # Errors
    ///
    /// Returns [SubmitFailure::Validation] without calling the store if the
    /// form is invalid, and [SubmitFailure::Store] if the store failed. The
    /// view is left unchanged on failure.
    pub fn submit_create(&mut self, form: &EntryForm) -> Result<LedgerEntry, SubmitFailure> {
        self.transition(SubmitState::Idle);
        self.transition(SubmitState::Validating);

        let categories = match self.store.list_categories() {
            Ok(categories) => categories,
            Err(error) => return Err(self.fail(SubmitFailure::Store(error))),
        };

        let entry = match validate_new_entry(form, &categories) {
            Ok(entry) => entry,
            Err(errors) => return Err(self.fail(SubmitFailure::Validation(errors))),
        };

        self.transition(SubmitState::Persisting);
        match self.store.create(self.owner_id, &entry) {
            Ok(created) => {
                self.refresh();
                self.transition(SubmitState::Success);
                Ok(created)
            }
            Err(error) => Err(self.fail(SubmitFailure::Store(error))),
        }
    }

    /// Validate and apply changes to the entry `id`.
    ///
    /// # Errors
    ///
    /// Same as [EntryLifecycle::submit_create]. An entry that is missing or
    /// owned by someone else fails with [Error::NotFoundOrForbidden].
    pub fn submit_update(
        &mut self,
        id: EntryId,
        form: &EntryForm,
    ) -> Result<LedgerEntry, SubmitFailure> {
        self.transition(SubmitState::Idle);
        self.transition(SubmitState::Validating);

        let patch = match validate_entry_patch(form) {
            Ok(patch) => patch,
            Err(errors) => return Err(self.fail(SubmitFailure::Validation(errors))),
        };

        self.transition(SubmitState::Persisting);
        match self.store.update(id, self.owner_id, &patch) {
            Ok(updated) => {
                self.refresh();
                self.transition(SubmitState::Success);
                Ok(updated)
            }
            Err(error) => Err(self.fail(SubmitFailure::Store(error))),
        }
    }

    /// Ask to delete the entry `id`. Nothing is deleted until the returned
    /// token is passed to [EntryLifecycle::confirm_delete].
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFoundOrForbidden] if the entry is not in the loaded view.
    pub fn request_delete(&self, id: EntryId) -> Result<PendingDelete, Error> {
        let is_in_view = self
            .view
            .as_ref()
            .is_some_and(|view| view.entries.iter().any(|entry| entry.id == id));

        if is_in_view {
            Ok(PendingDelete { entry_id: id })
        } else {
            Err(Error::NotFoundOrForbidden)
        }
    }

    /// Delete the entry named by `pending` and drop it from the view.
    ///
    /// The totals are recomputed from the remaining entries without going
    /// back to the store.
    ///
    /// # Errors
    ///
    /// Returns the store error, e.g. [Error::NotFoundOrForbidden] if the
    /// entry was already deleted. The view is unchanged on failure.
    pub fn confirm_delete(&mut self, pending: PendingDelete) -> Result<(), SubmitFailure> {
        self.transition(SubmitState::Idle);
        self.transition(SubmitState::Persisting);

        if let Err(error) = self.store.delete(pending.entry_id, self.owner_id) {
            return Err(self.fail(SubmitFailure::Store(error)));
        }

        if let Some(view) = self.view.take() {
            let entries = view
                .entries
                .into_iter()
                .filter(|entry| entry.id != pending.entry_id)
                .collect();
            self.view = Some(PeriodView::new(view.period, entries));
        }

        self.transition(SubmitState::Success);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use rust_decimal::Decimal;
    use time::{Month, macros::date};

    use crate::{
        Error,
        auth::UserID,
        ledger::{
            core::{
                Amount, CategoryId, CategoryType, EntryId, EntryPatch, LedgerEntry,
                PaymentStatus, ValidatedEntry,
            },
            period::Period,
            store::LedgerStore,
            validation::{EntryForm, ValidationError},
        },
    };

    use super::{EntryLifecycle, SubmitFailure, SubmitState};

    const OWNER: UserID = UserID::new(1);

    /// An in-memory store that can be told to fail.
    #[derive(Default)]
    struct StubStore {
        entries: RefCell<Vec<LedgerEntry>>,
        next_id: Cell<i64>,
        fail_with: RefCell<Option<Error>>,
        list_calls: Cell<usize>,
        write_calls: Cell<usize>,
    }

    impl StubStore {
        fn with_entries(entries: Vec<LedgerEntry>) -> Self {
            let next_id = entries.iter().map(|entry| entry.id.as_i64()).max().unwrap_or(0);

            Self {
                entries: RefCell::new(entries),
                next_id: Cell::new(next_id),
                ..Default::default()
            }
        }

        fn failing(&self, error: Error) {
            *self.fail_with.borrow_mut() = Some(error);
        }

        fn check_failure(&self) -> Result<(), Error> {
            match self.fail_with.borrow().clone() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

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

    impl LedgerStore for StubStore {
        fn list_for_period(
            &self,
            owner_id: UserID,
            period: Period,
        ) -> Result<Vec<LedgerEntry>, Error> {
            self.list_calls.set(self.list_calls.get() + 1);
            self.check_failure()?;

            Ok(self
                .entries
                .borrow()
                .iter()
                .filter(|entry| entry.owner_id == owner_id && period.contains(entry.posted_date))
                .cloned()
                .collect())
        }

        fn create(&self, owner_id: UserID, entry: &ValidatedEntry) -> Result<LedgerEntry, Error> {
            self.write_calls.set(self.write_calls.get() + 1);
            self.check_failure()?;

            self.next_id.set(self.next_id.get() + 1);
            let category = categories()
                .into_iter()
                .find(|category| category.id == entry.category_id)
                .ok_or_else(|| Error::ValidationRejected("unknown category".to_owned()))?;
            let created = LedgerEntry {
                id: EntryId::new(self.next_id.get()),
                owner_id,
                description: entry.description.clone(),
                amount: entry.amount,
                category,
                posted_date: entry.posted_date,
                payment: entry.payment,
            };
            self.entries.borrow_mut().push(created.clone());

            Ok(created)
        }

        fn update(
            &self,
            id: EntryId,
            owner_id: UserID,
            patch: &EntryPatch,
        ) -> Result<LedgerEntry, Error> {
            self.write_calls.set(self.write_calls.get() + 1);
            self.check_failure()?;

            let mut entries = self.entries.borrow_mut();
            let entry = entries
                .iter_mut()
                .find(|entry| entry.id == id && entry.owner_id == owner_id)
                .ok_or(Error::NotFoundOrForbidden)?;
            entry.description = patch.description.clone();
            entry.amount = patch.amount;
            entry.posted_date = patch.posted_date;
            entry.payment = patch.payment;

            Ok(entry.clone())
        }

        fn delete(&self, id: EntryId, owner_id: UserID) -> Result<(), Error> {
            self.write_calls.set(self.write_calls.get() + 1);
            self.check_failure()?;

            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|entry| !(entry.id == id && entry.owner_id == owner_id));

            if entries.len() == before {
                Err(Error::NotFoundOrForbidden)
            } else {
                Ok(())
            }
        }

        fn get(&self, id: EntryId, owner_id: UserID) -> Result<LedgerEntry, Error> {
            self.check_failure()?;

            self.entries
                .borrow()
                .iter()
                .find(|entry| entry.id == id && entry.owner_id == owner_id)
                .cloned()
                .ok_or(Error::NotFoundOrForbidden)
        }

        fn list_categories(&self) -> Result<Vec<CategoryType>, Error> {
            self.check_failure()?;

            Ok(categories())
        }
    }

    fn entry(id: i64, label_id: i64, cents: i64) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new(id),
            owner_id: OWNER,
            description: format!("entry {id}"),
            amount: Amount::new(Decimal::new(cents, 2)).unwrap(),
            category: categories()
                .into_iter()
                .find(|category| category.id == CategoryId::new(label_id))
                .unwrap(),
            posted_date: date!(2026 - 02 - 10),
            payment: PaymentStatus::Pending,
        }
    }

    fn february() -> Period {
        Period::new(2026, Month::February).unwrap()
    }

    fn loaded_lifecycle(entries: Vec<LedgerEntry>) -> EntryLifecycle<StubStore> {
        let mut lifecycle = EntryLifecycle::new(StubStore::with_entries(entries), OWNER);
        lifecycle.load_period(february()).unwrap();
        lifecycle
    }

    fn valid_form() -> EntryForm {
        EntryForm {
            description: "Mercado".to_owned(),
            amount: "250,00".to_owned(),
            category_id: "2".to_owned(),
            posted_date: "2026-02-14".to_owned(),
            paid: None,
            paid_date: String::new(),
        }
    }

    #[test]
    fn starts_idle_with_no_view() {
        let lifecycle = EntryLifecycle::new(StubStore::default(), OWNER);

        assert_eq!(lifecycle.state(), &SubmitState::Idle);
        assert!(lifecycle.view().is_none());
    }

    #[test]
    fn load_period_totals_entries() {
        let lifecycle = loaded_lifecycle(vec![entry(1, 1, 10000), entry(2, 2, 4000)]);
        let view = lifecycle.view().unwrap();

        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.aggregate.balance, Decimal::new(6000, 2));
    }

    #[test]
    fn load_period_failure_leaves_empty_view() {
        let store = StubStore::with_entries(vec![entry(1, 1, 10000)]);
        store.failing(Error::StoreUnavailable("offline".to_owned()));
        let mut lifecycle = EntryLifecycle::new(store, OWNER);

        let result = lifecycle.load_period(february()).map(|view| view.clone());

        assert_eq!(result, Err(Error::StoreUnavailable("offline".to_owned())));
        let view = lifecycle.view().unwrap();
        assert!(view.entries.is_empty());
        assert!(view.aggregate.balance.is_zero());
    }

    #[test]
    fn invalid_form_never_reaches_store() {
        let mut lifecycle = loaded_lifecycle(vec![]);
        let form = EntryForm {
            amount: "0".to_owned(),
            ..valid_form()
        };

        let result = lifecycle.submit_create(&form);

        let Err(SubmitFailure::Validation(errors)) = result else {
            panic!("want validation failure, got {result:?}");
        };
        assert_eq!(errors.amount, Some(ValidationError::InvalidAmount));
        assert_eq!(lifecycle.store().write_calls.get(), 0);
        assert!(matches!(
            lifecycle.state(),
            SubmitState::Failed(SubmitFailure::Validation(_))
        ));
    }

    #[test]
    fn successful_create_refreshes_view() {
        let mut lifecycle = loaded_lifecycle(vec![entry(1, 1, 100000)]);
        let list_calls_before = lifecycle.store().list_calls.get();

        let created = lifecycle.submit_create(&valid_form()).unwrap();

        assert_eq!(created.amount.value(), Decimal::new(25000, 2));
        assert_eq!(lifecycle.state(), &SubmitState::Success);
        assert_eq!(lifecycle.store().list_calls.get(), list_calls_before + 1);
        let view = lifecycle.view().unwrap();
        assert!(view.entries.iter().any(|entry| entry.id == created.id));
        assert_eq!(view.aggregate.total_expense, Decimal::new(25000, 2));
    }

    #[test]
    fn store_failure_keeps_view() {
        let mut lifecycle = loaded_lifecycle(vec![entry(1, 1, 100000)]);
        let view_before = lifecycle.view().cloned();
        lifecycle
            .store()
            .failing(Error::StoreUnavailable("offline".to_owned()));

        let result = lifecycle.submit_create(&valid_form());

        assert_eq!(
            result,
            Err(SubmitFailure::Store(Error::StoreUnavailable(
                "offline".to_owned()
            )))
        );
        assert_eq!(lifecycle.view().cloned(), view_before);
        assert!(matches!(
            lifecycle.state(),
            SubmitState::Failed(SubmitFailure::Store(_))
        ));
    }

    #[test]
    fn new_attempt_starts_over_after_failure() {
        let mut lifecycle = loaded_lifecycle(vec![]);
        let _ = lifecycle.submit_create(&EntryForm::default());

        lifecycle.submit_create(&valid_form()).unwrap();

        assert_eq!(lifecycle.state(), &SubmitState::Success);
    }

    #[test]
    fn update_of_foreign_entry_is_not_found_or_forbidden() {
        let mut foreign = entry(1, 2, 5000);
        foreign.owner_id = UserID::new(2);
        let mut lifecycle = loaded_lifecycle(vec![foreign.clone()]);

        let result = lifecycle.submit_update(foreign.id, &valid_form());

        assert_eq!(
            result,
            Err(SubmitFailure::Store(Error::NotFoundOrForbidden))
        );
        assert_eq!(lifecycle.store().get(foreign.id, UserID::new(2)), Ok(foreign));
    }

    #[test]
    fn successful_update_refreshes_totals() {
        let mut lifecycle = loaded_lifecycle(vec![entry(1, 2, 5000)]);

        let updated = lifecycle
            .submit_update(EntryId::new(1), &valid_form())
            .unwrap();

        assert_eq!(updated.description, "Mercado");
        assert_eq!(
            lifecycle.view().unwrap().aggregate.total_expense,
            Decimal::new(25000, 2)
        );
    }

    #[test]
    fn delete_needs_entry_in_view() {
        let lifecycle = loaded_lifecycle(vec![entry(1, 2, 5000)]);

        assert!(lifecycle.request_delete(EntryId::new(1)).is_ok());
        assert_eq!(
            lifecycle.request_delete(EntryId::new(99)),
            Err(Error::NotFoundOrForbidden)
        );
    }

    #[test]
    fn dropping_pending_delete_deletes_nothing() {
        let lifecycle = loaded_lifecycle(vec![entry(1, 2, 5000)]);

        drop(lifecycle.request_delete(EntryId::new(1)).unwrap());

        assert_eq!(lifecycle.store().write_calls.get(), 0);
        assert_eq!(lifecycle.view().unwrap().entries.len(), 1);
    }

    #[test]
    fn confirmed_delete_reconciles_locally() {
        let mut lifecycle = loaded_lifecycle(vec![entry(1, 1, 10000), entry(2, 2, 4000)]);
        let list_calls_before = lifecycle.store().list_calls.get();

        let pending = lifecycle.request_delete(EntryId::new(2)).unwrap();
        lifecycle.confirm_delete(pending).unwrap();

        assert_eq!(lifecycle.store().list_calls.get(), list_calls_before);
        let view = lifecycle.view().unwrap();
        assert!(view.entries.iter().all(|entry| entry.id != EntryId::new(2)));
        assert_eq!(view.aggregate.balance, Decimal::new(10000, 2));
        assert_eq!(lifecycle.state(), &SubmitState::Success);
    }

    #[test]
    fn failed_delete_keeps_view() {
        let mut lifecycle = loaded_lifecycle(vec![entry(1, 2, 5000)]);
        let pending = lifecycle.request_delete(EntryId::new(1)).unwrap();
        lifecycle.store().entries.borrow_mut().clear();

        let result = lifecycle.confirm_delete(pending);

        assert_eq!(result, Err(SubmitFailure::Store(Error::NotFoundOrForbidden)));
        assert_eq!(lifecycle.view().unwrap().entries.len(), 1);
    }
}
