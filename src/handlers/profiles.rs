use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    models::{Profile, UpdateRoleRequest},
    response::ApiResponse,
};

/// get_me
///
/// [Authenticated Route] Profile of the caller.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> ApiResult<ApiResponse> {
    let profile = state
        .repo
        .get_profile(user.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    ApiResponse::ok().with("profile", profile)
}

#[utoipa::path(
    get,
    path = "/admin/profiles",
    responses(
        (status = 200, description = "Profiles", body = [Profile]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_profiles(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    let profiles = state.repo.list_profiles().await?;
    ApiResponse::ok().with("profiles", profiles)
}

/// update_profile_role
///
/// [Admin Route] Changes the role of a profile. Admins cannot demote
/// themselves, which keeps at least the acting admin in place.
#[utoipa::path(
    put,
    path = "/admin/profiles/{user_id}/role",
    params(("user_id" = Uuid, Path, description = "Profile user ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated", body = Profile),
        (status = 400, description = "Self-demotion"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_profile_role(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    let Json(req) = payload?;
    if user_id == user.id && req.role != user.role {
        return Err(ApiError::validation("admins cannot change their own role"));
    }

    let profile = state
        .repo
        .set_profile_role(user_id, req.role)
        .await?
        .ok_or_else(|| ApiError::not_found("profile"))?;
    tracing::info!(user_id = %user_id, role = %profile.role, by = %user.id, "profile role changed");
    ApiResponse::ok().with("profile", profile)
}
