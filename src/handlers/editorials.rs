use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::{check_update_fields, clean_tags, resolve_new_slug};
use crate::{
    AppState,
    auth::AuthUser,
    content::normalize_tags,
    drafts,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery},
    models::{CreatePostRequest, EditorialDraft, EditorialDraftRequest, Post, UpdatePostRequest},
    repository::ListFilter,
    response::ApiResponse,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EditorialQuery {
    /// Maximum number of rows to return.
    pub limit: Option<i64>,
    /// Only editorials carrying this tag.
    pub tag: Option<String>,
}

/// list_editorials
///
/// [Public Route] Published editorials, newest first, optionally narrowed to
/// one tag.
#[utoipa::path(
    get,
    path = "/editorials",
    params(EditorialQuery),
    responses((status = 200, description = "Published editorials", body = [Post]))
)]
pub async fn list_editorials(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EditorialQuery>,
) -> ApiResult<ApiResponse> {
    let filter = ListFilter {
        tag: query.tag.filter(|t| !t.trim().is_empty()),
        ..ListFilter::public().with_limit(query.limit)
    };
    let posts = state.repo.list_posts(&filter).await?;
    ApiResponse::ok().with("editorials", posts)
}

#[utoipa::path(
    get,
    path = "/editorials/{slug}",
    params(("slug" = String, Path, description = "Editorial slug")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not found or unpublished")
    )
)]
pub async fn get_editorial_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse> {
    let post = state
        .repo
        .get_post_by_slug(&slug)
        .await?
        .filter(|p| p.is_published)
        .ok_or_else(|| ApiError::not_found("editorial"))?;
    ApiResponse::ok().with("editorial", post)
}

#[utoipa::path(
    get,
    path = "/admin/editorials",
    responses((status = 200, description = "All editorials", body = [Post]))
)]
pub async fn admin_list_editorials(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    let posts = state.repo.list_posts(&ListFilter::default()).await?;
    ApiResponse::ok().with("editorials", posts)
}

#[utoipa::path(
    get,
    path = "/admin/editorials/{id}",
    params(("id" = Uuid, Path, description = "Editorial ID")),
    responses((status = 200, description = "Found", body = Post))
)]
pub async fn admin_get_editorial(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    let post = state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("editorial"))?;
    ApiResponse::ok().with("editorial", post)
}

/// create_editorial
///
/// [Admin Route] Inserts a post. Tags are trimmed and deduplicated.
#[utoipa::path(
    post,
    path = "/admin/editorials",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Invalid payload or duplicate slug")
    )
)]
pub async fn create_editorial(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(mut req) = payload?;
    req.slug = Some(resolve_new_slug(req.slug.as_deref(), &req.title)?);
    req.title = req.title.trim().to_string();
    req.tags = normalize_tags(&req.tags);

    let post = state.repo.create_post(req).await?;
    tracing::info!(post_id = %post.id, slug = %post.slug, by = %user.id, "editorial created");
    ApiResponse::created().with("editorial", post)
}

#[utoipa::path(
    put,
    path = "/admin/editorials/{id}",
    params(("id" = Uuid, Path, description = "Editorial ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_editorial(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(mut req) = payload?;
    check_update_fields(&mut req.title, &mut req.slug)?;
    req.tags = clean_tags(req.tags);

    let post = state
        .repo
        .update_post(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("editorial"))?;
    ApiResponse::ok().with("editorial", post)
}

#[utoipa::path(
    delete,
    path = "/admin/editorials/{id}",
    params(("id" = Uuid, Path, description = "Editorial ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_editorial(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    if !state.repo.delete_post(id).await? {
        return Err(ApiError::not_found("editorial"));
    }
    tracing::info!(post_id = %id, by = %user.id, "editorial deleted");
    ApiResponse::ok().with("id", id)
}

/// generate_editorial_draft
///
/// [Admin Route] Placeholder copy for a new editorial. Nothing is stored;
/// the editor saves the draft through `create_editorial`.
#[utoipa::path(
    post,
    path = "/admin/editorials/draft",
    request_body = EditorialDraftRequest,
    responses(
        (status = 200, description = "Generated draft", body = EditorialDraft),
        (status = 400, description = "Missing title")
    )
)]
pub async fn generate_editorial_draft(
    _user: AuthUser,
    payload: Result<Json<EditorialDraftRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(req) = payload?;
    if req.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    ApiResponse::ok().with("draft", drafts::generate_editorial(&req))
}
