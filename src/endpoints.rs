//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/entries/{entry_id}/edit', use [format_endpoint].

/// The public landing page.
pub const ROOT: &str = "/";
/// The landing page for logged in users, shows one month of ledger entries.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for creating a new ledger entry.
pub const NEW_ENTRY_VIEW: &str = "/entries/new";
/// The page for editing an existing ledger entry.
pub const EDIT_ENTRY_VIEW: &str = "/entries/{entry_id}/edit";
/// The confirmation dialog shown before deleting a ledger entry.
pub const DELETE_ENTRY_VIEW: &str = "/entries/{entry_id}/delete";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create ledger entries.
pub const ENTRIES_API: &str = "/api/entries";
/// The route to update or delete a single ledger entry.
pub const ENTRY_API: &str = "/api/entries/{entry_id}";

/// Replace the `{...}` parameter in `endpoint_path` with `id`,
/// e.g. `format_endpoint(ENTRY_API, 3)` gives "/api/entries/3".
///
/// Paths without a parameter are returned unchanged. Only the first
/// parameter is replaced.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };
    let end = endpoint_path[start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| start + offset + 1);

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
