use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::settings::load_content_limits;
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::ApiQuery,
    models::{InstagramPost, InstagramSyncRequest},
    response::ApiResponse,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InstagramQuery {
    /// Defaults to the `instagram` content limit.
    pub limit: Option<i64>,
}

/// list_instagram
///
/// [Public Route] Cached Instagram posts, newest first.
#[utoipa::path(
    get,
    path = "/instagram",
    params(InstagramQuery),
    responses((status = 200, description = "Cached posts", body = [InstagramPost]))
)]
pub async fn list_instagram(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InstagramQuery>,
) -> ApiResult<ApiResponse> {
    let limit = match query.limit {
        Some(limit) => limit,
        None => i64::from(load_content_limits(&state.repo).await?.instagram),
    };
    let posts = state.repo.list_instagram(Some(limit)).await?;
    ApiResponse::ok().with("posts", posts)
}

/// sync_instagram
///
/// [Admin Route] Replaces the whole cache with the supplied posts. The posts
/// are fetched from Instagram by the caller.
#[utoipa::path(
    post,
    path = "/admin/instagram/sync",
    request_body = InstagramSyncRequest,
    responses(
        (status = 200, description = "Number of cached posts"),
        (status = 400, description = "Malformed body or duplicate post id"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn sync_instagram(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<InstagramSyncRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    let Json(req) = payload?;
    if req.posts.iter().any(|p| p.id.trim().is_empty()) {
        return Err(ApiError::validation("every post needs an id"));
    }

    let count = state.repo.replace_instagram_cache(req.posts).await?;
    tracing::info!(count, by = %user.id, "instagram cache replaced");
    ApiResponse::ok().with("count", count)
}
