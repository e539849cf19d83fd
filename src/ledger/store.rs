//! Owner-scoped storage of ledger entries.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, named_params};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    ledger::{
        core::{
            CategoryId, CategoryType, EntryId, EntryPatch, LedgerEntry, PaymentStatus,
            ValidatedEntry,
        },
        period::Period,
    },
};

/// Reads and writes ledger entries on behalf of one owner at a time.
///
/// Every call names the owner explicitly. An entry that exists but belongs
/// to another owner is reported exactly like one that does not exist.
pub trait LedgerStore {
    /// The owner's entries posted within `period`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [Error::StoreUnavailable] if the store could not be queried.
    fn list_for_period(&self, owner_id: UserID, period: Period)
    -> Result<Vec<LedgerEntry>, Error>;

    /// Store a new entry for `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::ValidationRejected] if the store refused the entry,
    /// e.g. for an unknown category, or [Error::StoreUnavailable].
    fn create(&self, owner_id: UserID, entry: &ValidatedEntry) -> Result<LedgerEntry, Error>;

    /// Apply `patch` to the entry `id` of `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFoundOrForbidden] if no entry matches both `id`
    /// and `owner_id`.
    fn update(&self, id: EntryId, owner_id: UserID, patch: &EntryPatch)
    -> Result<LedgerEntry, Error>;

    /// Remove the entry `id` of `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFoundOrForbidden] if no entry matches both `id`
    /// and `owner_id`, including when it was already deleted.
    fn delete(&self, id: EntryId, owner_id: UserID) -> Result<(), Error>;

    /// A single entry of `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFoundOrForbidden] if no entry matches both `id`
    /// and `owner_id`.
    fn get(&self, id: EntryId, owner_id: UserID) -> Result<LedgerEntry, Error>;

    /// All category types ordered by label.
    fn list_categories(&self) -> Result<Vec<CategoryType>, Error>;
}

/// The labels every new database starts with.
const SEED_CATEGORIES: [(i64, &str); 2] = [(1, "Receita"), (2, "Despesa")];

/// Create the category type and ledger entry tables and seed the categories.
///
/// The user table must already exist.
///
/// # Errors
///
/// Returns an error if the SQL query failed.
pub fn create_ledger_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category_type (
                id INTEGER PRIMARY KEY,
                label TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS ledger_entry (
                id INTEGER PRIMARY KEY,
                owner_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                description TEXT NOT NULL CHECK (length(trim(description)) > 0),
                amount TEXT NOT NULL CHECK (CAST(amount AS REAL) > 0),
                category_type_id INTEGER NOT NULL REFERENCES category_type(id),
                posted_date TEXT NOT NULL,
                is_paid INTEGER NOT NULL DEFAULT 0 CHECK (is_paid IN (0, 1)),
                paid_date TEXT,
                CHECK ((is_paid = 1) = (paid_date IS NOT NULL))
            );

            CREATE INDEX IF NOT EXISTS idx_ledger_entry_owner_posted_date
                ON ledger_entry(owner_id, posted_date);",
    )?;

    let mut seed =
        connection.prepare("INSERT OR IGNORE INTO category_type (id, label) VALUES (?1, ?2)")?;
    for (id, label) in SEED_CATEGORIES {
        seed.execute((id, label))?;
    }

    Ok(())
}

const SELECT_ENTRY: &str = "SELECT e.id, e.owner_id, e.description, e.amount, c.id, c.label,
        e.posted_date, e.is_paid, e.paid_date
    FROM ledger_entry e
    INNER JOIN category_type c ON c.id = e.category_type_id";

fn map_entry_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    let is_paid: bool = row.get(7)?;
    let paid_date: Option<Date> = row.get(8)?;

    let payment = match (is_paid, paid_date) {
        (true, Some(date)) => PaymentStatus::Paid(date),
        _ => PaymentStatus::Pending,
    };

    Ok(LedgerEntry {
        id: EntryId::new(row.get(0)?),
        owner_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        amount: row.get(3)?,
        category: CategoryType {
            id: CategoryId::new(row.get(4)?),
            label: row.get(5)?,
        },
        posted_date: row.get(6)?,
        payment,
    })
}

/// Treat "no rows" as a missing or foreign entry.
fn not_found_or_forbidden(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::NotFoundOrForbidden,
        error => error.into(),
    }
}

/// Stores ledger entries in a SQLite database.
///
/// The user table and [create_ledger_tables] must be set up first.
#[derive(Debug, Clone)]
pub struct SQLiteLedgerStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteLedgerStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire the database lock: {error}");
            Error::StoreUnavailable(error.to_string())
        })
    }

    fn get_with_connection(
        connection: &Connection,
        id: EntryId,
        owner_id: UserID,
    ) -> Result<LedgerEntry, Error> {
        connection
            .prepare(&format!(
                "{SELECT_ENTRY} WHERE e.id = :id AND e.owner_id = :owner_id"
            ))?
            .query_row(
                named_params! {":id": id.as_i64(), ":owner_id": owner_id.as_i64()},
                map_entry_row,
            )
            .map_err(not_found_or_forbidden)
    }
}

impl LedgerStore for SQLiteLedgerStore {
    fn list_for_period(
        &self,
        owner_id: UserID,
        period: Period,
    ) -> Result<Vec<LedgerEntry>, Error> {
        let connection = self.lock()?;

        connection
            .prepare(&format!(
                "{SELECT_ENTRY}
                WHERE e.owner_id = :owner_id
                    AND e.posted_date >= :first_day
                    AND e.posted_date <= :last_day
                ORDER BY e.posted_date DESC, e.id DESC"
            ))?
            .query_map(
                named_params! {
                    ":owner_id": owner_id.as_i64(),
                    ":first_day": period.first_day(),
                    ":last_day": period.last_day(),
                },
                map_entry_row,
            )?
            .map(|row| row.map_err(Error::from))
            .collect()
    }

    fn create(&self, owner_id: UserID, entry: &ValidatedEntry) -> Result<LedgerEntry, Error> {
        let connection = self.lock()?;

        connection.execute(
            "INSERT INTO ledger_entry
                (owner_id, description, amount, category_type_id, posted_date, is_paid, paid_date)
            VALUES
                (:owner_id, :description, :amount, :category_type_id, :posted_date, :is_paid, :paid_date)",
            named_params! {
                ":owner_id": owner_id.as_i64(),
                ":description": entry.description,
                ":amount": entry.amount,
                ":category_type_id": entry.category_id.as_i64(),
                ":posted_date": entry.posted_date,
                ":is_paid": entry.payment.is_paid(),
                ":paid_date": entry.payment.paid_date(),
            },
        )?;

        let id = EntryId::new(connection.last_insert_rowid());
        tracing::debug!("Created ledger entry {id} for user {owner_id}");

        Self::get_with_connection(&connection, id, owner_id)
    }

    fn update(
        &self,
        id: EntryId,
        owner_id: UserID,
        patch: &EntryPatch,
    ) -> Result<LedgerEntry, Error> {
        let connection = self.lock()?;

        let rows_affected = connection.execute(
            "UPDATE ledger_entry
            SET description = :description,
                amount = :amount,
                posted_date = :posted_date,
                is_paid = :is_paid,
                paid_date = :paid_date
            WHERE id = :id AND owner_id = :owner_id",
            named_params! {
                ":description": patch.description,
                ":amount": patch.amount,
                ":posted_date": patch.posted_date,
                ":is_paid": patch.payment.is_paid(),
                ":paid_date": patch.payment.paid_date(),
                ":id": id.as_i64(),
                ":owner_id": owner_id.as_i64(),
            },
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFoundOrForbidden);
        }

        Self::get_with_connection(&connection, id, owner_id)
    }

    fn delete(&self, id: EntryId, owner_id: UserID) -> Result<(), Error> {
        let rows_affected = self.lock()?.execute(
            "DELETE FROM ledger_entry WHERE id = :id AND owner_id = :owner_id",
            named_params! {":id": id.as_i64(), ":owner_id": owner_id.as_i64()},
        )?;

        match rows_affected {
            0 => Err(Error::NotFoundOrForbidden),
            _ => Ok(()),
        }
    }

    fn get(&self, id: EntryId, owner_id: UserID) -> Result<LedgerEntry, Error> {
        Self::get_with_connection(&self.lock()?, id, owner_id)
    }

    fn list_categories(&self) -> Result<Vec<CategoryType>, Error> {
        self.lock()?
            .prepare("SELECT id, label FROM category_type ORDER BY label ASC")?
            .query_map([], |row| {
                Ok(CategoryType {
                    id: CategoryId::new(row.get(0)?),
                    label: row.get(1)?,
                })
            })?
            .map(|row| row.map_err(Error::from))
            .collect()
    }
}
