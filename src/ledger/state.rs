//! The slice of the app state used by the ledger handlers.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    AppState,
    auth::{UserID, get_user_by_id},
    ledger::{lifecycle::EntryLifecycle, store::SQLiteLedgerStore},
};

/// The state needed by the ledger pages and endpoints.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The database connection for managing ledger entries.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl LedgerState {
    pub fn store(&self) -> SQLiteLedgerStore {
        SQLiteLedgerStore::new(self.db_connection.clone())
    }

    /// A lifecycle controller for the ledger of `user_id`.
    pub fn lifecycle(&self, user_id: UserID) -> EntryLifecycle<SQLiteLedgerStore> {
        EntryLifecycle::new(self.store(), user_id)
    }

    /// The display name of `user_id`, or `None` if it could not be read.
    pub fn user_name(&self, user_id: UserID) -> Option<String> {
        let connection = match self.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire the database lock: {error}");
                return None;
            }
        };

        match get_user_by_id(user_id, &connection) {
            Ok(user) => Some(user.name),
            Err(error) => {
                tracing::warn!("Could not get the name of user {user_id}: {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use crate::{
        auth::UserID,
        test_utils::{insert_test_user, test_db},
    };

    use super::LedgerState;

    fn test_state() -> (LedgerState, UserID) {
        let connection = test_db();
        let user_id = insert_test_user(&connection, "maria@example.com");

        (
            LedgerState {
                db_connection: connection,
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
        )
    }

    #[test]
    fn user_name_is_looked_up() {
        let (state, user_id) = test_state();

        assert_eq!(state.user_name(user_id), Some("Test User".to_owned()));
        assert_eq!(state.user_name(UserID::new(user_id.as_i64() + 1)), None);
    }

    #[test]
    fn user_name_is_none_when_lock_is_poisoned() {
        let (state, user_id) = test_state();
        let connection = Arc::clone(&state.db_connection);

        let _ = thread::spawn(move || {
            let _guard = connection.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(state.db_connection.is_poisoned());
        assert_eq!(state.user_name(user_id), None);
    }
}
