//! Sets up the application database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, ledger::create_ledger_tables};

/// Create the tables for the users and their ledgers if they do not exist.
///
/// Foreign keys are switched on for `connection` since SQLite leaves them
/// off by default.
///
/// # Errors
///
/// Returns an error if any table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_ledger_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}
