//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ffi;

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth token in the cookie jar")]
    CookieMissing,

    /// The auth token in the cookie could not be read or has expired.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The display name is too short.
    #[error("name must have at least two characters")]
    InvalidName,

    /// A user with the email address is already registered.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The ledger store could not be reached or the query failed.
    ///
    /// Callers should treat this as "no data" for reads and report the
    /// failure for writes. The operation is not retried.
    #[error("the ledger store is unavailable: {0}")]
    StoreUnavailable(String),

    /// The ledger store rejected a write because it violated a constraint.
    #[error("the ledger store rejected the entry: {0}")]
    ValidationRejected(String),

    /// No entry matched both the entry ID and the owner.
    ///
    /// Deliberately does not say whether the entry is missing or belongs to
    /// someone else.
    #[error("the entry does not exist or belongs to another user")]
    NotFoundOrForbidden,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, desc)
                if matches!(
                    sql_error.extended_code,
                    ffi::SQLITE_CONSTRAINT_CHECK
                        | ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                        | ffi::SQLITE_CONSTRAINT_NOTNULL
                ) =>
            {
                let message = desc.unwrap_or_else(|| sql_error.to_string());
                tracing::warn!("the store rejected a write: {message}");
                Error::ValidationRejected(message)
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::StoreUnavailable(error.to_string())
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::NotFoundOrForbidden => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::StoreUnavailable(_) => InternalServerError {
                description: "Could not load your data",
                fix: "The ledger could not be reached. Try again in a moment.",
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::NotFoundOrForbidden => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not find the entry".to_owned(),
                    details: "The entry could not be found. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            Error::ValidationRejected(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "The entry was rejected".to_owned(),
                    details: reason,
                },
            ),
            Error::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Alert::Error {
                    message: "Could not reach the ledger".to_owned(),
                    details: "Your changes were not saved. Try again in a moment.".to_owned(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rusqlite::Connection;

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    fn constraint_error(sql: &str) -> rusqlite::Error {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch(
                "PRAGMA foreign_keys = ON;
                CREATE TABLE parent (id INTEGER PRIMARY KEY);
                CREATE TABLE child (
                    id INTEGER PRIMARY KEY,
                    parent_id INTEGER NOT NULL REFERENCES parent(id),
                    amount INTEGER NOT NULL CHECK (amount > 0)
                );",
            )
            .unwrap();

        connection.execute(sql, []).unwrap_err()
    }

    #[test]
    fn foreign_key_constraint_maps_to_validation_rejected() {
        let error = Error::from(constraint_error(
            "INSERT INTO child (parent_id, amount) VALUES (42, 1)",
        ));

        assert!(
            matches!(error, Error::ValidationRejected(_)),
            "want ValidationRejected, got {error:?}"
        );
    }

    #[test]
    fn not_null_constraint_maps_to_validation_rejected() {
        let error = Error::from(constraint_error(
            "INSERT INTO child (parent_id, amount) VALUES (NULL, -1)",
        ));

        assert!(
            matches!(error, Error::ValidationRejected(_)),
            "want ValidationRejected, got {error:?}"
        );
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn unknown_sql_error_maps_to_store_unavailable() {
        let connection = Connection::open_in_memory().unwrap();
        let error = connection
            .execute("SELECT * FROM table_that_does_not_exist", [])
            .unwrap_err();

        assert!(matches!(Error::from(error), Error::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn not_found_or_forbidden_renders_404_alert() {
        let response = Error::NotFoundOrForbidden.into_alert_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Could not find the entry"));
    }

    #[tokio::test]
    async fn store_unavailable_renders_503_alert() {
        let response = Error::StoreUnavailable("timeout".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
