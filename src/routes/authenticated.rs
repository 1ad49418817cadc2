use crate::{AppState, handlers::profiles};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any signed-in user regardless of role. The router is wrapped
/// in the auth middleware, so handlers only run with a resolved `AuthUser`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // Profile and role of the caller, used by the admin UI to pick its menus.
        .route("/me", get(profiles::get_me))
}
