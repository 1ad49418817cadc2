use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    AppState,
    auth::AuthUser,
    content::CONTENT_LIMITS_KEY,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    models::{ContentLimits, SiteSetting, UpsertSettingRequest},
    repository::RepositoryState,
    response::ApiResponse,
};

/// Current homepage limits, defaults when the setting is absent or malformed.
pub(crate) async fn load_content_limits(repo: &RepositoryState) -> ApiResult<ContentLimits> {
    let setting = repo.get_setting(CONTENT_LIMITS_KEY).await?;
    Ok(ContentLimits::from_setting(setting.as_ref().map(|s| &s.value)))
}

/// get_content_limits
///
/// [Public Route] How many projects, editorials and Instagram posts the
/// homepage shows.
#[utoipa::path(
    get,
    path = "/settings/content-limits",
    responses((status = 200, description = "Effective limits", body = ContentLimits))
)]
pub async fn get_content_limits(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    let limits = load_content_limits(&state.repo).await?;
    ApiResponse::ok().with("limits", limits)
}

#[utoipa::path(
    get,
    path = "/admin/settings",
    responses((status = 200, description = "All settings", body = [SiteSetting]))
)]
pub async fn list_settings(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    let settings = state.repo.list_settings().await?;
    ApiResponse::ok().with("settings", settings)
}

#[utoipa::path(
    get,
    path = "/admin/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Found", body = SiteSetting),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_setting(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> ApiResult<ApiResponse> {
    let setting = state
        .repo
        .get_setting(&key)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("setting {key}")))?;
    ApiResponse::ok().with("setting", setting)
}

/// upsert_setting
///
/// [Admin Route] Creates or replaces a setting. An omitted description keeps
/// the stored one.
#[utoipa::path(
    put,
    path = "/admin/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpsertSettingRequest,
    responses(
        (status = 200, description = "Stored", body = SiteSetting),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn upsert_setting(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
    payload: Result<Json<UpsertSettingRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    let Json(req) = payload?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ApiError::validation("setting key is required"));
    }

    let setting = state
        .repo
        .upsert_setting(key, req.value, req.description)
        .await?;
    tracing::info!(key = %setting.key_name, by = %user.id, "setting updated");
    ApiResponse::ok().with("setting", setting)
}
