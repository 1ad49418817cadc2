use crate::{
    AppState,
    handlers::{editorials, enquiries, home, instagram, listings, projects, settings},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: the read side of the marketing
/// site and the contact form.
///
/// Every content handler here filters on `is_published`, so drafts never
/// leave the admin surface.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /home
        // Hero, latest projects and editorials, and the Instagram strip in one call.
        .route("/home", get(home::get_home))
        .route("/projects", get(projects::list_projects))
        // The static segment wins over `{slug}`.
        .route("/projects/hero", get(projects::get_hero_project))
        .route("/projects/{slug}", get(projects::get_project_by_slug))
        // GET /editorials?tag=...&limit=...
        .route("/editorials", get(editorials::list_editorials))
        .route("/editorials/{slug}", get(editorials::get_editorial_by_slug))
        // GET /listings?status=...&limit=...
        .route("/listings", get(listings::list_listings))
        .route("/listings/{slug}", get(listings::get_listing_by_slug))
        .route("/instagram", get(instagram::list_instagram))
        .route("/settings/content-limits", get(settings::get_content_limits))
        // POST /enquiries
        // Contact form. No dedup, spam filtering or rate limiting.
        .route("/enquiries", post(enquiries::create_enquiry))
}
