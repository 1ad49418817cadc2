use axum::extract::State;

use crate::{
    AppState,
    auth::AuthUser,
    content::LEGACY_IMAGE_PREFIX,
    error::ApiResult,
    models::{CleanupReport, DashboardStats},
    response::ApiResponse,
};

/// cleanup_legacy_content
///
/// [Admin Route] Deletes projects and editorials still pointing at images
/// under the retired `/images/` prefix. Repeat calls report zero rows.
#[utoipa::path(
    post,
    path = "/admin/maintenance/cleanup",
    responses(
        (status = 200, description = "Removed rows", body = CleanupReport),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn cleanup_legacy_content(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    let report = state
        .repo
        .cleanup_legacy_content(LEGACY_IMAGE_PREFIX)
        .await?;
    tracing::warn!(
        projects = report.projects.len(),
        posts = report.posts.len(),
        by = %user.id,
        "legacy content removed"
    );
    ApiResponse::ok().with("report", report)
}

/// get_dashboard_stats
///
/// [Admin Route] Row counts for the admin dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = DashboardStats))
)]
pub async fn get_dashboard_stats(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    let stats = state.repo.get_stats().await?;
    ApiResponse::ok().with("stats", stats)
}
