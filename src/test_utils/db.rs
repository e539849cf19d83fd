use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    auth::{Email, PasswordHash, User, UserID, ValidatedPassword, create_user},
    db::initialize,
};

/// An initialized in-memory database.
pub(crate) fn test_db() -> Arc<Mutex<Connection>> {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    Arc::new(Mutex::new(connection))
}

/// Insert a user with a dummy password hash and return their ID.
pub(crate) fn insert_test_user(connection: &Arc<Mutex<Connection>>, email: &str) -> UserID {
    let connection = connection.lock().unwrap();

    create_user(
        "Test User",
        Email::new_unchecked(email),
        PasswordHash::new_unchecked("hunter2"),
        &connection,
    )
    .expect("Could not create test user")
    .id
}

/// A database with one user who can log in with `email` and `password`.
pub(crate) fn test_connection_with_user(
    email: &str,
    password: &str,
) -> (Arc<Mutex<Connection>>, User) {
    let connection = test_db();
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(password), 4)
        .expect("Could not hash password");

    let user = create_user(
        "Maria Silva",
        Email::new_unchecked(email),
        password_hash,
        &connection.lock().unwrap(),
    )
    .expect("Could not create test user");

    (connection, user)
}
