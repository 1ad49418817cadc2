use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Raised when a text column holds a value outside a closed enum.
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// --- Identity ---

/// Role
///
/// Authorization level stored on `profiles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            _ => Err(UnknownVariant {
                kind: "role",
                value,
            }),
        }
    }
}

/// Profile
///
/// Local mirror of an identity-provider user, keyed by the token subject.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Projects ---

/// ImagePair
///
/// Two images shown side by side on a project page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ImagePair {
    pub left: String,
    pub right: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Project
///
/// A completed or ongoing development, row of `projects`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Project {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub year: Option<i32>,
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub facts: Value,
    pub hero_image_path: Option<String>,
    pub project_images: Vec<String>,
    #[sqlx(json)]
    pub image_pairs: Vec<ImagePair>,
    // At most one project carries the flag; see `Repository::set_hero_project`.
    pub is_hero: bool,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CreateProjectRequest
///
/// `slug` is derived from `title` when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    #[ts(type = "unknown")]
    #[schema(value_type = Option<Object>)]
    pub facts: Option<Value>,
    #[serde(default)]
    pub hero_image_path: Option<String>,
    #[serde(default)]
    pub project_images: Vec<String>,
    #[serde(default)]
    pub image_pairs: Vec<ImagePair>,
    #[serde(default)]
    pub is_published: bool,
}

/// UpdateProjectRequest
///
/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateProjectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    #[schema(value_type = Option<Object>)]
    pub facts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pairs: Option<Vec<ImagePair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

// --- Editorials ---

/// Post
///
/// An editorial (blog) entry, row of `posts`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image_path: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image_path: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

// --- Listings ---

/// ListingStatus
///
/// Sales state of a listing, stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ListingStatus {
    #[default]
    ForSale,
    UnderOffer,
    Sold,
    ComingSoon,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForSale => "for_sale",
            Self::UnderOffer => "under_offer",
            Self::Sold => "sold",
            Self::ComingSoon => "coming_soon",
        }
    }
}

impl TryFrom<String> for ListingStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "for_sale" => Ok(Self::ForSale),
            "under_offer" => Ok(Self::UnderOffer),
            "sold" => Ok(Self::Sold),
            "coming_soon" => Ok(Self::ComingSoon),
            _ => Err(UnknownVariant {
                kind: "listing status",
                value,
            }),
        }
    }
}

/// Listing
///
/// A property on the market, row of `listings`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Listing {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub facts: Value,
    pub location: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ListingStatus,
    pub hero_image_path: Option<String>,
    pub hero_video_url: Option<String>,
    pub brochure_pdf_path: Option<String>,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateListingRequest {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[ts(type = "unknown")]
    #[schema(value_type = Option<Object>)]
    pub facts: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub hero_image_path: Option<String>,
    #[serde(default)]
    pub hero_video_url: Option<String>,
    #[serde(default)]
    pub brochure_pdf_path: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateListingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    #[schema(value_type = Option<Object>)]
    pub facts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brochure_pdf_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

// --- Publish workflow ---

/// PublishRequest
///
/// Body of `PUT /admin/content/{kind}/{id}/publish`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PublishRequest {
    pub is_published: bool,
}

/// PublishState
///
/// The publish columns of a content row after a toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PublishState {
    pub id: Uuid,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
}

// --- Enquiries ---

/// Enquiry
///
/// A contact-form submission, row of `enquiries`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Enquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    #[ts(type = "Record<string, unknown>")]
    #[schema(value_type = Object)]
    pub context: Value,
    pub source: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CreateEnquiryRequest
///
/// Public contact-form payload. Required fields are optional here so the
/// handler can answer a precise validation message.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateEnquiryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub listing_slug: Option<String>,
    #[serde(default)]
    pub project_slug: Option<String>,
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub preferred_contact: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    #[schema(value_type = Option<Object>)]
    pub context: Option<serde_json::Map<String, Value>>,
}

/// NewEnquiry
///
/// A validated enquiry ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub context: Value,
    pub source: String,
}

// --- Settings ---

/// SiteSetting
///
/// Generic key/value row of `site_settings`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SiteSetting {
    pub key_name: String,
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub value: Value,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpsertSettingRequest {
    #[ts(type = "unknown")]
    #[schema(value_type = Object)]
    pub value: Value,
    #[serde(default)]
    pub description: Option<String>,
}

/// ContentLimits
///
/// Homepage item counts, stored under the `content_limits` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ContentLimits {
    pub projects: u32,
    pub editorials: u32,
    pub instagram: u32,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            projects: 6,
            editorials: 3,
            instagram: 8,
        }
    }
}

// --- Profiles (admin) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// --- Instagram mirror ---

/// InstagramPost
///
/// One cached media item, row of `instagram_cache`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InstagramPost {
    pub id: String,
    pub media_url: String,
    pub permalink: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub media_type: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InstagramSyncRequest {
    pub posts: Vec<InstagramPost>,
}

// --- Storage ---

/// PresignedUrlRequest
///
/// Input for a short-lived direct upload URL (POST /admin/storage/presigned).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "facade.jpg")]
    pub filename: String,
    /// The MIME type the upload is constrained to.
    #[schema(example = "image/jpeg")]
    pub file_type: String,
    #[serde(default)]
    #[schema(example = "projects")]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// Time-limited URL for the PUT request.
    pub upload_url: String,
    /// Object key to persist on the content row once the upload completes.
    pub resource_key: String,
}

/// UploadedObject
///
/// Result of a direct upload: the key to persist and its public URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UploadedObject {
    pub path: String,
    pub url: String,
    pub size: u64,
}

/// ExtensionUsage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExtensionUsage {
    pub count: u64,
    pub bytes: u64,
}

/// StorageStats
///
/// Bucket usage against the fixed quota, grouped by file extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StorageStats {
    pub total_bytes: u64,
    pub total_files: u64,
    pub quota_bytes: u64,
    pub remaining_bytes: u64,
    pub used_percent: f64,
    pub by_extension: BTreeMap<String, ExtensionUsage>,
}

// --- Maintenance & dashboard ---

/// RemovedItem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RemovedItem {
    pub id: Uuid,
    pub slug: String,
}

/// CleanupReport
///
/// Rows removed by the legacy image-path cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CleanupReport {
    pub projects: Vec<RemovedItem>,
    pub posts: Vec<RemovedItem>,
    pub total: u64,
}

/// DashboardStats
///
/// Counters for the admin dashboard (GET /admin/stats).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub total_projects: i64,
    pub published_projects: i64,
    pub total_editorials: i64,
    pub published_editorials: i64,
    pub total_listings: i64,
    pub total_enquiries: i64,
}

// --- Editorial drafts ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EditorialDraftRequest {
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// EditorialDraft
///
/// Generated placeholder copy for a new editorial. Never persisted by itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EditorialDraft {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub tags: Vec<String>,
}
