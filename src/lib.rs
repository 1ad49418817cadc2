use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod content;
pub mod drafts;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;
pub mod storage;

// Route groups split by caller (public, authenticated, admin).
pub mod routes;
use auth::AuthUser;
use handlers::{
    editorials, enquiries, home, instagram, listings, maintenance, profiles, projects, publish,
    settings, storage as storage_handlers,
};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document of every route, served at `/api-docs/openapi.json` and
/// browsable through Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        home::get_home,
        projects::list_projects, projects::get_project_by_slug, projects::get_hero_project,
        projects::admin_list_projects, projects::admin_get_project, projects::create_project,
        projects::update_project, projects::delete_project, projects::set_hero_project,
        editorials::list_editorials, editorials::get_editorial_by_slug,
        editorials::admin_list_editorials, editorials::admin_get_editorial,
        editorials::create_editorial, editorials::update_editorial, editorials::delete_editorial,
        editorials::generate_editorial_draft,
        listings::list_listings, listings::get_listing_by_slug, listings::admin_list_listings,
        listings::admin_get_listing, listings::create_listing, listings::update_listing,
        listings::delete_listing,
        publish::set_publish_state,
        enquiries::create_enquiry, enquiries::list_enquiries, enquiries::delete_enquiry,
        settings::get_content_limits, settings::list_settings, settings::get_setting,
        settings::upsert_setting,
        profiles::get_me, profiles::list_profiles, profiles::update_profile_role,
        instagram::list_instagram, instagram::sync_instagram,
        storage_handlers::get_storage_stats, storage_handlers::list_objects,
        storage_handlers::upload_object, storage_handlers::get_presigned_url,
        storage_handlers::delete_object,
        maintenance::cleanup_legacy_content, maintenance::get_dashboard_stats,
    ),
    components(
        schemas(
            models::Project, models::CreateProjectRequest, models::UpdateProjectRequest,
            models::ImagePair, models::Post, models::CreatePostRequest, models::UpdatePostRequest,
            models::Listing, models::ListingStatus, models::CreateListingRequest,
            models::UpdateListingRequest, models::PublishRequest, models::PublishState,
            models::Enquiry, models::CreateEnquiryRequest, models::SiteSetting,
            models::UpsertSettingRequest, models::ContentLimits, models::Profile, models::Role,
            models::UpdateRoleRequest, models::InstagramPost, models::InstagramSyncRequest,
            models::PresignedUrlRequest, models::PresignedUrlResponse, models::UploadedObject,
            models::ExtensionUsage, models::StorageStats, models::RemovedItem,
            models::CleanupReport, models::DashboardStats, models::EditorialDraftRequest,
            models::EditorialDraft, content::ContentKind, error::ErrorBody,
            storage_handlers::UploadForm,
        )
    ),
    tags(
        (name = "estate-cms", description = "Marketing site and CMS API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared, immutable container of the services every handler needs.
#[derive(Clone)]
pub struct AppState {
    /// Content store (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Image bucket (S3-compatible in production, mock in tests).
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the authenticated route group. Extracting `AuthUser` runs token
/// validation and the profile lookup; a failure rejects the request before
/// the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles every route group, the state and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Role checks happen inside the admin handlers.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
