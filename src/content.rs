//! Content rules shared by every repository implementation: publish-state
//! derivation, slugs, tags, content limits and the legacy image prefix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::ContentLimits;

/// Key of the homepage content-limits row in `site_settings`.
pub const CONTENT_LIMITS_KEY: &str = "content_limits";

/// Image paths under this prefix come from the retired local-file convention.
pub const LEGACY_IMAGE_PREFIX: &str = "/images/";

/// ContentKind
///
/// The publishable content tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Projects,
    Editorials,
    Listings,
}

impl ContentKind {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Editorials => "posts",
            Self::Listings => "listings",
        }
    }

    /// Singular label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Projects => "project",
            Self::Editorials => "editorial",
            Self::Listings => "listing",
        }
    }
}

/// Derives `publishedAt` for a requested publish state.
///
/// Publishing keeps an existing timestamp, so repeating it is a no-op;
/// unpublishing always clears it.
pub fn resolve_published_at(
    current: Option<DateTime<Utc>>,
    publish: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if publish { current.or(Some(now)) } else { None }
}

/// Lowercase ASCII slug: alphanumeric runs joined by single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Picks the explicit slug when given, otherwise derives one from the title.
pub fn slug_or_title(slug: Option<&str>, title: &str) -> String {
    match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(explicit) => slugify(explicit),
        None => slugify(title),
    }
}

/// Trims tags, drops empty ones and removes duplicates keeping first occurrence.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

impl ContentLimits {
    /// Reads limits from the stored setting value.
    ///
    /// Accepts an object or a JSON-encoded string; missing fields take their
    /// defaults and anything unparsable yields the defaults.
    pub fn from_setting(value: Option<&Value>) -> Self {
        let parsed = match value {
            Some(Value::String(raw)) => serde_json::from_str::<Self>(raw).ok(),
            Some(other @ Value::Object(_)) => serde_json::from_value::<Self>(other.clone()).ok(),
            _ => None,
        };
        parsed.unwrap_or_default()
    }
}
