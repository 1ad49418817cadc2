use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use uuid::Uuid;

use super::{ListQuery, check_update_fields, resolve_new_slug};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery},
    models::{CreateProjectRequest, Project, UpdateProjectRequest},
    repository::ListFilter,
    response::ApiResponse,
};

/// list_projects
///
/// [Public Route] Published projects, newest first.
#[utoipa::path(
    get,
    path = "/projects",
    params(ListQuery),
    responses((status = 200, description = "Published projects", body = [Project]))
)]
pub async fn list_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<ApiResponse> {
    let filter = ListFilter::public().with_limit(query.limit);
    let projects = state.repo.list_projects(&filter).await?;
    ApiResponse::ok().with("projects", projects)
}

/// get_project_by_slug
///
/// [Public Route] A single published project. Drafts answer 404.
#[utoipa::path(
    get,
    path = "/projects/{slug}",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Found", body = Project),
        (status = 404, description = "Not found or unpublished")
    )
)]
pub async fn get_project_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<ApiResponse> {
    let project = state
        .repo
        .get_project_by_slug(&slug)
        .await?
        .filter(|p| p.is_published)
        .ok_or_else(|| ApiError::not_found("project"))?;
    ApiResponse::ok().with("project", project)
}

/// get_hero_project
///
/// [Public Route] The project featured on the homepage, when it is published.
#[utoipa::path(
    get,
    path = "/projects/hero",
    responses(
        (status = 200, description = "Hero project", body = Project),
        (status = 404, description = "No published hero")
    )
)]
pub async fn get_hero_project(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    let project = state
        .repo
        .get_hero_project()
        .await?
        .filter(|p| p.is_published)
        .ok_or_else(|| ApiError::not_found("hero project"))?;
    ApiResponse::ok().with("project", project)
}

/// admin_list_projects
///
/// [Admin Route] Every project including drafts.
#[utoipa::path(
    get,
    path = "/admin/projects",
    responses((status = 200, description = "All projects", body = [Project]))
)]
pub async fn admin_list_projects(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    let projects = state.repo.list_projects(&ListFilter::default()).await?;
    ApiResponse::ok().with("projects", projects)
}

#[utoipa::path(
    get,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses((status = 200, description = "Found", body = Project))
)]
pub async fn admin_get_project(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    let project = state
        .repo
        .get_project(id)
        .await?
        .ok_or_else(|| ApiError::not_found("project"))?;
    ApiResponse::ok().with("project", project)
}

/// create_project
///
/// [Admin Route] Inserts a project. The slug is derived from the title when
/// omitted; a taken slug answers 400.
#[utoipa::path(
    post,
    path = "/admin/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Created", body = Project),
        (status = 400, description = "Invalid payload or duplicate slug")
    )
)]
pub async fn create_project(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(mut req) = payload?;
    req.slug = Some(resolve_new_slug(req.slug.as_deref(), &req.title)?);
    req.title = req.title.trim().to_string();

    let project = state.repo.create_project(req).await?;
    tracing::info!(project_id = %project.id, slug = %project.slug, by = %user.id, "project created");
    ApiResponse::created().with("project", project)
}

/// update_project
///
/// [Admin Route] Partial update. Supplying `isPublished` follows the publish
/// toggle rules for `publishedAt`.
#[utoipa::path(
    put,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_project(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(mut req) = payload?;
    check_update_fields(&mut req.title, &mut req.slug)?;

    let project = state
        .repo
        .update_project(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("project"))?;
    ApiResponse::ok().with("project", project)
}

#[utoipa::path(
    delete,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_project(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    if !state.repo.delete_project(id).await? {
        return Err(ApiError::not_found("project"));
    }
    tracing::info!(project_id = %id, by = %user.id, "project deleted");
    ApiResponse::ok().with("id", id)
}

/// set_hero_project
///
/// [Admin Route] Makes `{id}` the only hero project.
#[utoipa::path(
    put,
    path = "/admin/projects/{id}/hero",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Hero updated", body = Project),
        (status = 404, description = "Not found, no flag changed")
    )
)]
pub async fn set_hero_project(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    let project = state
        .repo
        .set_hero_project(id)
        .await?
        .ok_or_else(|| ApiError::not_found("project"))?;
    tracing::info!(project_id = %id, by = %user.id, "hero project set");
    ApiResponse::ok().with("project", project)
}
