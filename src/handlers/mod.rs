//! HTTP handlers, one module per resource. Every handler answers the
//! `{ success, ... }` envelope through `ApiResponse` or an `ApiError`.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::content::{normalize_tags, slug_or_title, slugify};
use crate::error::ApiError;

pub mod editorials;
pub mod enquiries;
pub mod home;
pub mod instagram;
pub mod listings;
pub mod maintenance;
pub mod profiles;
pub mod projects;
pub mod publish;
pub mod settings;
pub mod storage;

/// ListQuery
///
/// Query parameters of `GET /projects`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum number of rows to return.
    pub limit: Option<i64>,
}

/// Validates a title and resolves the slug of a new row.
pub(crate) fn resolve_new_slug(slug: Option<&str>, title: &str) -> Result<String, ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    let slug = slug_or_title(slug, title);
    if slug.is_empty() {
        return Err(ApiError::validation("slug must contain letters or digits"));
    }
    Ok(slug)
}

/// Normalizes the optional title and slug of a partial update.
pub(crate) fn check_update_fields(
    title: &mut Option<String>,
    slug: &mut Option<String>,
) -> Result<(), ApiError> {
    if let Some(t) = title.as_deref() {
        if t.trim().is_empty() {
            return Err(ApiError::validation("title cannot be blank"));
        }
        *title = Some(t.trim().to_string());
    }
    if let Some(s) = slug.as_deref() {
        let normalized = slugify(s);
        if normalized.is_empty() {
            return Err(ApiError::validation("slug must contain letters or digits"));
        }
        *slug = Some(normalized);
    }
    Ok(())
}

pub(crate) fn clean_tags(tags: Option<Vec<String>>) -> Option<Vec<String>> {
    tags.map(|t| normalize_tags(&t))
}
