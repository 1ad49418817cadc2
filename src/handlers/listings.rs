use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::{check_update_fields, resolve_new_slug};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery},
    models::{CreateListingRequest, Listing, ListingStatus, UpdateListingRequest},
    repository::ListFilter,
    response::ApiResponse,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Maximum number of rows to return.
    pub limit: Option<i64>,
    pub status: Option<ListingStatus>,
}

/// list_listings
///
/// [Public Route] Published listings, newest first. `status` narrows to one
/// sales state; an unknown status answers 400.
#[utoipa::path(
    get,
    path = "/listings",
    params(ListingQuery),
    responses(
        (status = 200, description = "Published listings", body = [Listing]),
        (status = 400, description = "Unknown status")
    )
)]
pub async fn list_listings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQuery>,
) -> ApiResult<ApiResponse> {
    let filter = ListFilter {
        status: query.status,
        ..ListFilter::public().with_limit(query.limit)
    };
    let listings = state.repo.list_listings(&filter).await?;
    ApiResponse::ok().with("listings", listings)
}

#[utoipa::path(
    get,
    path = "/listings/{slug}",
    params(("slug" = String, Path, description = "Listing slug")),
    responses(
        (status = 200, description = "Found", body = Listing),
        (status = 404, description = "Not found or unpublished")
    )
)]
pub async fn get_listing_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse> {
    let listing = state
        .repo
        .get_listing_by_slug(&slug)
        .await?
        .filter(|l| l.is_published)
        .ok_or_else(|| ApiError::not_found("listing"))?;
    ApiResponse::ok().with("listing", listing)
}

#[utoipa::path(
    get,
    path = "/admin/listings",
    responses((status = 200, description = "All listings", body = [Listing]))
)]
pub async fn admin_list_listings(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    let listings = state.repo.list_listings(&ListFilter::default()).await?;
    ApiResponse::ok().with("listings", listings)
}

#[utoipa::path(
    get,
    path = "/admin/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses((status = 200, description = "Found", body = Listing))
)]
pub async fn admin_get_listing(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    let listing = state
        .repo
        .get_listing(id)
        .await?
        .ok_or_else(|| ApiError::not_found("listing"))?;
    ApiResponse::ok().with("listing", listing)
}

#[utoipa::path(
    post,
    path = "/admin/listings",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Created", body = Listing),
        (status = 400, description = "Invalid payload or duplicate slug")
    )
)]
pub async fn create_listing(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateListingRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(mut req) = payload?;
    req.slug = Some(resolve_new_slug(req.slug.as_deref(), &req.title)?);
    req.title = req.title.trim().to_string();

    let listing = state.repo.create_listing(req).await?;
    tracing::info!(listing_id = %listing.id, slug = %listing.slug, by = %user.id, "listing created");
    ApiResponse::created().with("listing", listing)
}

#[utoipa::path(
    put,
    path = "/admin/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    request_body = UpdateListingRequest,
    responses(
        (status = 200, description = "Updated", body = Listing),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_listing(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<UpdateListingRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(mut req) = payload?;
    check_update_fields(&mut req.title, &mut req.slug)?;

    let listing = state
        .repo
        .update_listing(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("listing"))?;
    ApiResponse::ok().with("listing", listing)
}

#[utoipa::path(
    delete,
    path = "/admin/listings/{id}",
    params(("id" = Uuid, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_listing(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    if !state.repo.delete_listing(id).await? {
        return Err(ApiError::not_found("listing"));
    }
    tracing::info!(listing_id = %id, by = %user.id, "listing deleted");
    ApiResponse::ok().with("id", id)
}
