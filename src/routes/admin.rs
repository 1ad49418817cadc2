use crate::{
    AppState,
    handlers::{
        editorials, enquiries, instagram, listings, maintenance, profiles, projects, publish,
        settings,
        storage::{self, MAX_UPLOAD_BYTES},
    },
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// The CMS surface, nested under `/admin`.
///
/// Access control:
/// Every handler takes `AuthUser`, so an anonymous request is rejected with
/// 401 before any work. Content management is open to editors and admins;
/// handlers of admin-only actions (enquiries, settings writes, roles,
/// Instagram sync, cleanup, object deletion) call `require_admin` and answer
/// 403 to editors.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(maintenance::get_dashboard_stats))
        // --- Content CRUD ---
        .route(
            "/projects",
            get(projects::admin_list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(projects::admin_get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // PUT /admin/projects/{id}/hero
        // Moves the single hero flag to this project.
        .route("/projects/{id}/hero", put(projects::set_hero_project))
        .route(
            "/editorials",
            get(editorials::admin_list_editorials).post(editorials::create_editorial),
        )
        .route(
            "/editorials/draft",
            post(editorials::generate_editorial_draft),
        )
        .route(
            "/editorials/{id}",
            get(editorials::admin_get_editorial)
                .put(editorials::update_editorial)
                .delete(editorials::delete_editorial),
        )
        .route(
            "/listings",
            get(listings::admin_list_listings).post(listings::create_listing),
        )
        .route(
            "/listings/{id}",
            get(listings::admin_get_listing)
                .put(listings::update_listing)
                .delete(listings::delete_listing),
        )
        // PUT /admin/content/{kind}/{id}/publish
        // Publish toggle shared by projects, editorials and listings.
        .route(
            "/content/{kind}/{id}/publish",
            put(publish::set_publish_state),
        )
        // --- Enquiries (admin only) ---
        .route("/enquiries", get(enquiries::list_enquiries))
        .route("/enquiries/{id}", delete(enquiries::delete_enquiry))
        // --- Settings & profiles ---
        .route("/settings", get(settings::list_settings))
        .route(
            "/settings/{key}",
            get(settings::get_setting).put(settings::upsert_setting),
        )
        .route("/profiles", get(profiles::list_profiles))
        .route(
            "/profiles/{user_id}/role",
            put(profiles::update_profile_role),
        )
        // --- Instagram & maintenance (admin only) ---
        .route("/instagram/sync", post(instagram::sync_instagram))
        .route(
            "/maintenance/cleanup",
            post(maintenance::cleanup_legacy_content),
        )
        // --- Storage ---
        .route("/storage/stats", get(storage::get_storage_stats))
        .route(
            "/storage/upload",
            post(storage::upload_object).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/storage/presigned", post(storage::get_presigned_url))
        .route(
            "/storage/objects",
            get(storage::list_objects).delete(storage::delete_object),
        )
}
