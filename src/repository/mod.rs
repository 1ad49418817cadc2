use crate::content::ContentKind;
use crate::error::RepoResult;
use crate::models::{
    CleanupReport, CreateListingRequest, CreatePostRequest, CreateProjectRequest, DashboardStats,
    Enquiry, InstagramPost, Listing, ListingStatus, NewEnquiry, Post, Profile, Project,
    PublishState, Role, SiteSetting, UpdateListingRequest, UpdatePostRequest,
    UpdateProjectRequest,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// ListFilter
///
/// Narrowing applied to content listings. `tag` only applies to editorials and
/// `status` only to listings.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub published_only: bool,
    pub limit: Option<i64>,
    pub tag: Option<String>,
    pub status: Option<ListingStatus>,
}

impl ListFilter {
    /// Published rows only, the view of anonymous visitors.
    pub fn public() -> Self {
        Self {
            published_only: true,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }
}

/// Repository
///
/// Persistence contract of the content store. Handlers only see this trait;
/// Postgres backs it in production and an in-memory store backs it in tests.
///
/// Create requests reach the repository already validated: `slug` is set and
/// tags are normalized.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Projects ---
    async fn list_projects(&self, filter: &ListFilter) -> RepoResult<Vec<Project>>;
    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>>;
    async fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<Project>>;
    async fn get_hero_project(&self) -> RepoResult<Option<Project>>;
    async fn create_project(&self, req: CreateProjectRequest) -> RepoResult<Project>;
    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>>;
    /// Clears `is_hero` everywhere, then sets it on `id`. `None` when `id` is
    /// unknown, in which case no flag is touched.
    async fn set_hero_project(&self, id: Uuid) -> RepoResult<Option<Project>>;
    async fn delete_project(&self, id: Uuid) -> RepoResult<bool>;

    // --- Editorials ---
    async fn list_posts(&self, filter: &ListFilter) -> RepoResult<Vec<Post>>;
    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>>;
    async fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>>;
    async fn create_post(&self, req: CreatePostRequest) -> RepoResult<Post>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>>;
    async fn delete_post(&self, id: Uuid) -> RepoResult<bool>;

    // --- Listings ---
    async fn list_listings(&self, filter: &ListFilter) -> RepoResult<Vec<Listing>>;
    async fn get_listing(&self, id: Uuid) -> RepoResult<Option<Listing>>;
    async fn get_listing_by_slug(&self, slug: &str) -> RepoResult<Option<Listing>>;
    async fn create_listing(&self, req: CreateListingRequest) -> RepoResult<Listing>;
    async fn update_listing(
        &self,
        id: Uuid,
        req: UpdateListingRequest,
    ) -> RepoResult<Option<Listing>>;
    async fn delete_listing(&self, id: Uuid) -> RepoResult<bool>;

    // --- Publish workflow ---
    /// Sets `is_published` and derives `published_at` for one content row.
    async fn set_published(
        &self,
        kind: ContentKind,
        id: Uuid,
        publish: bool,
    ) -> RepoResult<Option<PublishState>>;

    // --- Enquiries ---
    async fn create_enquiry(&self, enquiry: NewEnquiry) -> RepoResult<Enquiry>;
    async fn list_enquiries(&self) -> RepoResult<Vec<Enquiry>>;
    async fn delete_enquiry(&self, id: Uuid) -> RepoResult<bool>;

    // --- Site settings ---
    async fn list_settings(&self) -> RepoResult<Vec<SiteSetting>>;
    async fn get_setting(&self, key: &str) -> RepoResult<Option<SiteSetting>>;
    async fn upsert_setting(
        &self,
        key: &str,
        value: Value,
        description: Option<String>,
    ) -> RepoResult<SiteSetting>;

    // --- Profiles ---
    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<Profile>>;
    async fn list_profiles(&self) -> RepoResult<Vec<Profile>>;
    async fn set_profile_role(&self, user_id: Uuid, role: Role) -> RepoResult<Option<Profile>>;

    // --- Instagram mirror ---
    async fn list_instagram(&self, limit: Option<i64>) -> RepoResult<Vec<InstagramPost>>;
    /// Deletes every cached post, then inserts `posts`. Returns the stored count.
    async fn replace_instagram_cache(&self, posts: Vec<InstagramPost>) -> RepoResult<u64>;

    // --- Maintenance ---
    /// Deletes projects and posts whose image path starts with `prefix`.
    async fn cleanup_legacy_content(&self, prefix: &str) -> RepoResult<CleanupReport>;
    async fn get_stats(&self) -> RepoResult<DashboardStats>;
}

/// RepositoryState
///
/// Shared handle to the persistence layer held by `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
