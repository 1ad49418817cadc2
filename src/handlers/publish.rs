use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    content::ContentKind,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    models::{PublishRequest, PublishState},
    response::ApiResponse,
};

/// set_publish_state
///
/// [Admin Route] Publishes or unpublishes one project, editorial or listing.
///
/// Publishing stamps `publishedAt` only when it was unset, so repeating the
/// call keeps the original date. Unpublishing clears it.
#[utoipa::path(
    put,
    path = "/admin/content/{kind}/{id}/publish",
    params(
        ("kind" = ContentKind, Path, description = "projects, editorials or listings"),
        ("id" = Uuid, Path, description = "Row ID")
    ),
    request_body = PublishRequest,
    responses(
        (status = 200, description = "New publish state", body = PublishState),
        (status = 400, description = "Unknown kind or malformed body"),
        (status = 404, description = "Not found")
    )
)]
pub async fn set_publish_state(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath((kind, id)): ApiPath<(ContentKind, Uuid)>,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(req) = payload?;

    let published = state
        .repo
        .set_published(kind, id, req.is_published)
        .await?
        .ok_or_else(|| ApiError::not_found(kind.label()))?;

    tracing::info!(
        table = kind.table(),
        id = %id,
        is_published = published.is_published,
        by = %user.id,
        "publish state changed"
    );
    ApiResponse::ok().with("item", published)
}
