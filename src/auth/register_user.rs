//! The registration page and the handler that creates new accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, Email, PasswordHash, ValidatedPassword, create_user,
        password::PASSWORD_MIN_LENGTH, set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        TextInput, base, link, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// Display names shorter than this are rejected.
pub const NAME_MIN_LENGTH: usize = 2;

const PASSWORD_MISMATCH_MSG: &str = "Passwords do not match";
const DUPLICATE_EMAIL_MSG: &str = "An account with this email already exists.";

/// The raw data entered by the user in the registration form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Messages to show next to each registration field.
#[derive(Debug, Default, PartialEq)]
struct RegistrationErrors {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

impl RegistrationErrors {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(PASSWORD_MIN_LENGTH);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

fn registration_form(form: &RegisterForm, errors: &RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            "hx-target-422"="this"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (TextInput {
                label: "Name",
                name: "name",
                id: "name",
                type_: "text",
                value: &form.name,
                placeholder: "Maria Silva",
                required: true,
                autofocus: true,
                error_message: errors.name.as_deref(),
            }.into_html())

            (TextInput {
                label: "Email",
                name: "email",
                id: "email",
                type_: "email",
                value: &form.email,
                placeholder: "you@example.com",
                required: true,
                autofocus: false,
                error_message: errors.email.as_deref(),
            }.into_html())

            (password_input("", PASSWORD_MIN_LENGTH as u8, errors.password.as_deref()))
            (confirm_password_input(errors.confirm_password.as_deref()))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(&RegisterForm::default(), &RegistrationErrors::default());
    let content = log_in_register("Create your account", &form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// Check every field and collect one message per invalid field.
fn validate_registration(
    form: &RegisterForm,
) -> Result<(String, Email, ValidatedPassword), RegistrationErrors> {
    let mut errors = RegistrationErrors::default();

    let name = form.name.trim();
    if name.chars().count() < NAME_MIN_LENGTH {
        errors.name = Some(format!(
            "Name must have at least {NAME_MIN_LENGTH} characters."
        ));
    }

    let email = match Email::new(&form.email) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.email = Some("Enter a valid email address.".to_owned());
            None
        }
    };

    let password = match ValidatedPassword::new(&form.password, &[name, form.email.trim()]) {
        Ok(password) => Some(password),
        Err(Error::TooWeak(reason)) => {
            errors.password = Some(reason);
            None
        }
        Err(error) => {
            errors.password = Some(error.to_string());
            None
        }
    };

    if form.password != form.confirm_password {
        errors.confirm_password = Some(PASSWORD_MISMATCH_MSG.to_owned());
    }

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => {
            Ok((name.to_owned(), email, password))
        }
        _ => Err(errors),
    }
}

fn render_form_with_errors(form: &RegisterForm, errors: &RegistrationErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        registration_form(form, errors),
    )
        .into_response()
}

/// Handler for `POST /api/users`.
///
/// Creates the account, logs the new user in and redirects to the dashboard.
/// Invalid input re-renders the form with a message under each bad field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let (name, email, password) = match validate_registration(&form) {
        Ok(validated) => validated,
        Err(errors) => return render_form_with_errors(&form, &errors),
    };

    let password_hash = match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        create_user(&name, email, password_hash, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            let errors = RegistrationErrors {
                email: Some(DUPLICATE_EMAIL_MSG.to_owned()),
                ..Default::default()
            };
            return render_form_with_errors(&form, &errors);
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}
