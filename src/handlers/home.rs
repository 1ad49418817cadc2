use axum::extract::State;

use super::settings::load_content_limits;
use crate::{AppState, error::ApiResult, repository::ListFilter, response::ApiResponse};

/// get_home
///
/// [Public Route] Everything the homepage renders in one call: the hero
/// project, the latest projects and editorials, the Instagram strip and the
/// limits that sized them. Published content only.
#[utoipa::path(
    get,
    path = "/home",
    responses((status = 200, description = "Homepage aggregate"))
)]
pub async fn get_home(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    let limits = load_content_limits(&state.repo).await?;

    let hero = state
        .repo
        .get_hero_project()
        .await?
        .filter(|p| p.is_published);
    let projects = state
        .repo
        .list_projects(&ListFilter::public().with_limit(Some(i64::from(limits.projects))))
        .await?;
    let editorials = state
        .repo
        .list_posts(&ListFilter::public().with_limit(Some(i64::from(limits.editorials))))
        .await?;
    let instagram = state
        .repo
        .list_instagram(Some(i64::from(limits.instagram)))
        .await?;

    ApiResponse::ok()
        .with("hero", hero)?
        .with("projects", projects)?
        .with("editorials", editorials)?
        .with("instagram", instagram)?
        .with("limits", limits)
}
