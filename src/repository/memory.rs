use super::{ListFilter, Repository};
use crate::content::{ContentKind, resolve_published_at, slugify};
use crate::error::{RepoError, RepoResult};
use crate::models::{
    CleanupReport, CreateListingRequest, CreatePostRequest, CreateProjectRequest, DashboardStats,
    Enquiry, InstagramPost, Listing, NewEnquiry, Post, Profile, Project, PublishState, RemovedItem,
    Role, SiteSetting, UpdateListingRequest, UpdatePostRequest, UpdateProjectRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Row types sharing the publish columns.
trait Publishable {
    fn id(&self) -> Uuid;
    fn slug(&self) -> &str;
    fn is_published(&self) -> bool;
    fn published_at(&self) -> Option<DateTime<Utc>>;
    fn created_at(&self) -> DateTime<Utc>;
    fn set_publish(&mut self, publish: bool, now: DateTime<Utc>);
}

macro_rules! impl_publishable {
    ($ty:ty) => {
        impl Publishable for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn slug(&self) -> &str {
                &self.slug
            }
            fn is_published(&self) -> bool {
                self.is_published
            }
            fn published_at(&self) -> Option<DateTime<Utc>> {
                self.published_at
            }
            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
            fn set_publish(&mut self, publish: bool, now: DateTime<Utc>) {
                if self.is_published != publish {
                    self.updated_at = now;
                }
                self.published_at = resolve_published_at(self.published_at, publish, now);
                self.is_published = publish;
            }
        }
    };
}

impl_publishable!(Project);
impl_publishable!(Post);
impl_publishable!(Listing);

fn publish_state<T: Publishable>(row: &T) -> PublishState {
    PublishState {
        id: row.id(),
        is_published: row.is_published(),
        published_at: row.published_at(),
    }
}

/// Applies the shared listing rules: published filter, newest first, limit.
fn select<T: Publishable + Clone>(
    rows: &[T],
    filter: &ListFilter,
    extra: impl Fn(&T) -> bool,
) -> Vec<T> {
    let mut out: Vec<T> = rows
        .iter()
        .filter(|r| !filter.published_only || r.is_published())
        .filter(|r| extra(r))
        .cloned()
        .collect();
    // Option orders None first, so comparing b to a puts drafts last.
    out.sort_by(|a, b| {
        b.published_at()
            .cmp(&a.published_at())
            .then(b.created_at().cmp(&a.created_at()))
    });
    if let Some(limit) = filter.limit {
        out.truncate(limit.max(0) as usize);
    }
    out
}

fn ensure_unique_slug<T: Publishable>(
    rows: &[T],
    slug: &str,
    except: Option<Uuid>,
    what: &str,
) -> RepoResult<()> {
    if rows
        .iter()
        .any(|r| r.slug() == slug && Some(r.id()) != except)
    {
        return Err(RepoError::Duplicate(what.to_string()));
    }
    Ok(())
}

fn delete_by_id<T: Publishable>(rows: &mut Vec<T>, id: Uuid) -> bool {
    let before = rows.len();
    rows.retain(|r| r.id() != id);
    rows.len() != before
}

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    posts: Vec<Post>,
    listings: Vec<Listing>,
    enquiries: Vec<Enquiry>,
    settings: BTreeMap<String, SiteSetting>,
    profiles: HashMap<Uuid, Profile>,
    instagram: Vec<InstagramPost>,
}

/// InMemoryRepository
///
/// `Repository` over process memory with the same observable rules as the
/// Postgres implementation. Used by the test suite and for local tooling.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    fail: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository whose every call fails with a database error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Repository seeded with identity profiles.
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let tables = Tables {
            profiles: profiles.into_iter().map(|p| (p.user_id, p)).collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
            fail: false,
        }
    }

    fn check(&self) -> RepoResult<()> {
        if self.fail {
            return Err(RepoError::Database(sqlx::Error::Protocol(
                "simulated database failure".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- Projects ---

    async fn list_projects(&self, filter: &ListFilter) -> RepoResult<Vec<Project>> {
        self.check()?;
        Ok(select(&self.tables.read().await.projects, filter, |_| true))
    }

    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<Project>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.slug == slug).cloned())
    }

    async fn get_hero_project(&self) -> RepoResult<Option<Project>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.is_hero).cloned())
    }

    async fn create_project(&self, req: CreateProjectRequest) -> RepoResult<Project> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let slug = req.slug.unwrap_or_else(|| slugify(&req.title));
        ensure_unique_slug(&tables.projects, &slug, None, "project slug")?;

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            slug,
            title: req.title,
            summary: req.summary,
            content: req.content,
            year: req.year,
            facts: req.facts.unwrap_or_else(|| json!({})),
            hero_image_path: req.hero_image_path,
            project_images: req.project_images,
            image_pairs: req.image_pairs,
            is_hero: false,
            is_published: req.is_published,
            published_at: resolve_published_at(None, req.is_published, now),
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|r| r.id == id) {
            return Ok(None);
        }
        if let Some(slug) = &req.slug {
            ensure_unique_slug(&tables.projects, slug, Some(id), "project slug")?;
        }
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let now = Utc::now();
        if let Some(v) = req.slug {
            project.slug = v;
        }
        if let Some(v) = req.title {
            project.title = v;
        }
        if let Some(v) = req.summary {
            project.summary = Some(v);
        }
        if let Some(v) = req.content {
            project.content = Some(v);
        }
        if let Some(v) = req.year {
            project.year = Some(v);
        }
        if let Some(v) = req.facts {
            project.facts = v;
        }
        if let Some(v) = req.hero_image_path {
            project.hero_image_path = Some(v);
        }
        if let Some(v) = req.project_images {
            project.project_images = v;
        }
        if let Some(v) = req.image_pairs {
            project.image_pairs = v;
        }
        if let Some(publish) = req.is_published {
            project.set_publish(publish, now);
        }
        project.updated_at = now;
        Ok(Some(project.clone()))
    }

    async fn set_hero_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == id) {
            return Ok(None);
        }

        let now = Utc::now();
        for project in tables.projects.iter_mut().filter(|p| p.is_hero) {
            project.is_hero = false;
            project.updated_at = now;
        }
        let hero = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .map(|p| {
                p.is_hero = true;
                p.updated_at = now;
                p.clone()
            });
        Ok(hero)
    }

    async fn delete_project(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(delete_by_id(&mut self.tables.write().await.projects, id))
    }

    // --- Editorials ---

    async fn list_posts(&self, filter: &ListFilter) -> RepoResult<Vec<Post>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(select(&tables.posts, filter, |p| match &filter.tag {
            Some(tag) => p.tags.iter().any(|t| t == tag),
            None => true,
        }))
    }

    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn create_post(&self, req: CreatePostRequest) -> RepoResult<Post> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let slug = req.slug.unwrap_or_else(|| slugify(&req.title));
        ensure_unique_slug(&tables.posts, &slug, None, "editorial slug")?;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            slug,
            title: req.title,
            excerpt: req.excerpt,
            content: req.content,
            cover_image_path: req.cover_image_path,
            tags: req.tags,
            is_published: req.is_published,
            published_at: resolve_published_at(None, req.is_published, now),
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|r| r.id == id) {
            return Ok(None);
        }
        if let Some(slug) = &req.slug {
            ensure_unique_slug(&tables.posts, slug, Some(id), "editorial slug")?;
        }
        let Some(post) = tables.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let now = Utc::now();
        if let Some(v) = req.slug {
            post.slug = v;
        }
        if let Some(v) = req.title {
            post.title = v;
        }
        if let Some(v) = req.excerpt {
            post.excerpt = Some(v);
        }
        if let Some(v) = req.content {
            post.content = Some(v);
        }
        if let Some(v) = req.cover_image_path {
            post.cover_image_path = Some(v);
        }
        if let Some(v) = req.tags {
            post.tags = v;
        }
        if let Some(publish) = req.is_published {
            post.set_publish(publish, now);
        }
        post.updated_at = now;
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(delete_by_id(&mut self.tables.write().await.posts, id))
    }

    // --- Listings ---

    async fn list_listings(&self, filter: &ListFilter) -> RepoResult<Vec<Listing>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(select(&tables.listings, filter, |l| {
            filter.status.is_none_or(|s| l.status == s)
        }))
    }

    async fn get_listing(&self, id: Uuid) -> RepoResult<Option<Listing>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn get_listing_by_slug(&self, slug: &str) -> RepoResult<Option<Listing>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.listings.iter().find(|l| l.slug == slug).cloned())
    }

    async fn create_listing(&self, req: CreateListingRequest) -> RepoResult<Listing> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let slug = req.slug.unwrap_or_else(|| slugify(&req.title));
        ensure_unique_slug(&tables.listings, &slug, None, "listing slug")?;

        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            slug,
            title: req.title,
            subtitle: req.subtitle,
            description: req.description,
            facts: req.facts.unwrap_or_else(|| json!({})),
            location: req.location,
            status: req.status,
            hero_image_path: req.hero_image_path,
            hero_video_url: req.hero_video_url,
            brochure_pdf_path: req.brochure_pdf_path,
            is_published: req.is_published,
            published_at: resolve_published_at(None, req.is_published, now),
            created_at: now,
            updated_at: now,
        };
        tables.listings.push(listing.clone());
        Ok(listing)
    }

    async fn update_listing(
        &self,
        id: Uuid,
        req: UpdateListingRequest,
    ) -> RepoResult<Option<Listing>> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if !tables.listings.iter().any(|r| r.id == id) {
            return Ok(None);
        }
        if let Some(slug) = &req.slug {
            ensure_unique_slug(&tables.listings, slug, Some(id), "listing slug")?;
        }
        let Some(listing) = tables.listings.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };

        let now = Utc::now();
        if let Some(v) = req.slug {
            listing.slug = v;
        }
        if let Some(v) = req.title {
            listing.title = v;
        }
        if let Some(v) = req.subtitle {
            listing.subtitle = Some(v);
        }
        if let Some(v) = req.description {
            listing.description = Some(v);
        }
        if let Some(v) = req.facts {
            listing.facts = v;
        }
        if let Some(v) = req.location {
            listing.location = Some(v);
        }
        if let Some(v) = req.status {
            listing.status = v;
        }
        if let Some(v) = req.hero_image_path {
            listing.hero_image_path = Some(v);
        }
        if let Some(v) = req.hero_video_url {
            listing.hero_video_url = Some(v);
        }
        if let Some(v) = req.brochure_pdf_path {
            listing.brochure_pdf_path = Some(v);
        }
        if let Some(publish) = req.is_published {
            listing.set_publish(publish, now);
        }
        listing.updated_at = now;
        Ok(Some(listing.clone()))
    }

    async fn delete_listing(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(delete_by_id(&mut self.tables.write().await.listings, id))
    }

    // --- Publish workflow ---

    async fn set_published(
        &self,
        kind: ContentKind,
        id: Uuid,
        publish: bool,
    ) -> RepoResult<Option<PublishState>> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        fn apply<T: Publishable>(
            rows: &mut [T],
            id: Uuid,
            publish: bool,
            now: DateTime<Utc>,
        ) -> Option<PublishState> {
            rows.iter_mut().find(|r| r.id() == id).map(|row| {
                row.set_publish(publish, now);
                publish_state(row)
            })
        }

        Ok(match kind {
            ContentKind::Projects => apply(&mut tables.projects, id, publish, now),
            ContentKind::Editorials => apply(&mut tables.posts, id, publish, now),
            ContentKind::Listings => apply(&mut tables.listings, id, publish, now),
        })
    }

    // --- Enquiries ---

    async fn create_enquiry(&self, enquiry: NewEnquiry) -> RepoResult<Enquiry> {
        self.check()?;
        let row = Enquiry {
            id: Uuid::new_v4(),
            name: enquiry.name,
            email: enquiry.email,
            phone: enquiry.phone,
            message: enquiry.message,
            context: enquiry.context,
            source: enquiry.source,
            created_at: Utc::now(),
        };
        self.tables.write().await.enquiries.push(row.clone());
        Ok(row)
    }

    async fn list_enquiries(&self) -> RepoResult<Vec<Enquiry>> {
        self.check()?;
        let mut rows = self.tables.read().await.enquiries.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_enquiry(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let before = tables.enquiries.len();
        tables.enquiries.retain(|e| e.id != id);
        Ok(tables.enquiries.len() != before)
    }

    // --- Site settings ---

    async fn list_settings(&self) -> RepoResult<Vec<SiteSetting>> {
        self.check()?;
        Ok(self.tables.read().await.settings.values().cloned().collect())
    }

    async fn get_setting(&self, key: &str) -> RepoResult<Option<SiteSetting>> {
        self.check()?;
        Ok(self.tables.read().await.settings.get(key).cloned())
    }

    async fn upsert_setting(
        &self,
        key: &str,
        value: Value,
        description: Option<String>,
    ) -> RepoResult<SiteSetting> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let description =
            description.or_else(|| tables.settings.get(key).and_then(|s| s.description.clone()));
        let setting = SiteSetting {
            key_name: key.to_string(),
            value,
            description,
            updated_at: Utc::now(),
        };
        tables.settings.insert(key.to_string(), setting.clone());
        Ok(setting)
    }

    // --- Profiles ---

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        self.check()?;
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn list_profiles(&self) -> RepoResult<Vec<Profile>> {
        self.check()?;
        let mut rows: Vec<Profile> = self.tables.read().await.profiles.values().cloned().collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn set_profile_role(&self, user_id: Uuid, role: Role) -> RepoResult<Option<Profile>> {
        self.check()?;
        let mut tables = self.tables.write().await;
        Ok(tables.profiles.get_mut(&user_id).map(|p| {
            p.role = role;
            p.clone()
        }))
    }

    // --- Instagram mirror ---

    async fn list_instagram(&self, limit: Option<i64>) -> RepoResult<Vec<InstagramPost>> {
        self.check()?;
        let mut rows = self.tables.read().await.instagram.clone();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn replace_instagram_cache(&self, posts: Vec<InstagramPost>) -> RepoResult<u64> {
        self.check()?;
        let mut seen = HashSet::new();
        if !posts.iter().all(|p| seen.insert(p.id.clone())) {
            return Err(RepoError::Duplicate("instagram post id".to_string()));
        }
        let mut tables = self.tables.write().await;
        tables.instagram = posts;
        Ok(tables.instagram.len() as u64)
    }

    // --- Maintenance ---

    async fn cleanup_legacy_content(&self, prefix: &str) -> RepoResult<CleanupReport> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let is_legacy =
            |path: &Option<String>| path.as_deref().is_some_and(|p| p.starts_with(prefix));

        let (removed, kept): (Vec<Project>, Vec<Project>) = std::mem::take(&mut tables.projects)
            .into_iter()
            .partition(|p| is_legacy(&p.hero_image_path));
        tables.projects = kept;
        let projects: Vec<RemovedItem> = removed
            .into_iter()
            .map(|p| RemovedItem { id: p.id, slug: p.slug })
            .collect();

        let (removed, kept): (Vec<Post>, Vec<Post>) = std::mem::take(&mut tables.posts)
            .into_iter()
            .partition(|p| is_legacy(&p.cover_image_path));
        tables.posts = kept;
        let posts: Vec<RemovedItem> = removed
            .into_iter()
            .map(|p| RemovedItem { id: p.id, slug: p.slug })
            .collect();

        let total = (projects.len() + posts.len()) as u64;
        Ok(CleanupReport {
            projects,
            posts,
            total,
        })
    }

    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        self.check()?;
        let tables = self.tables.read().await;
        let count = |n: usize| n as i64;
        Ok(DashboardStats {
            total_projects: count(tables.projects.len()),
            published_projects: count(tables.projects.iter().filter(|p| p.is_published).count()),
            total_editorials: count(tables.posts.len()),
            published_editorials: count(tables.posts.iter().filter(|p| p.is_published).count()),
            total_listings: count(tables.listings.len()),
            total_enquiries: count(tables.enquiries.len()),
        })
    }
}
