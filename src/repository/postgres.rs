use super::{ListFilter, Repository};
use crate::content::{ContentKind, slugify};
use crate::error::{RepoError, RepoResult};
use crate::models::{
    CleanupReport, CreateListingRequest, CreatePostRequest, CreateProjectRequest, DashboardStats,
    Enquiry, InstagramPost, Listing, NewEnquiry, Post, Profile, Project, PublishState, RemovedItem,
    Role, SiteSetting, UpdateListingRequest, UpdatePostRequest, UpdateProjectRequest,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder, types::Json};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, slug, title, summary, content, year, facts, hero_image_path, \
     project_images, image_pairs, is_hero, is_published, published_at, created_at, updated_at";

const POST_COLUMNS: &str = "id, slug, title, excerpt, content, cover_image_path, tags, \
     is_published, published_at, created_at, updated_at";

const LISTING_COLUMNS: &str = "id, slug, title, subtitle, description, facts, location, status, \
     hero_image_path, hero_video_url, brochure_pdf_path, is_published, published_at, \
     created_at, updated_at";

const ENQUIRY_COLUMNS: &str = "id, name, email, phone, message, context, source, created_at";

const SETTING_COLUMNS: &str = "key_name, value, description, updated_at";

const PROFILE_COLUMNS: &str = "user_id, email, role, created_at";

const INSTAGRAM_COLUMNS: &str = r#"id, media_url, permalink, caption, media_type, "timestamp""#;

// Key of the transaction-scoped advisory lock serializing hero changes.
const HERO_LOCK_KEY: i64 = 0x4845_524F;

// Six binds per row keeps each insert well under the 65535 parameter cap.
const INSTAGRAM_BATCH_ROWS: usize = 1000;

// Newest publication first; drafts (no published_at) sink to the end.
const NEWEST_FIRST: &str = " ORDER BY published_at DESC NULLS LAST, created_at DESC";

/// Maps a unique-constraint violation onto `RepoError::Duplicate`.
fn unique_violation(what: &str) -> impl FnOnce(sqlx::Error) -> RepoError + '_ {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Duplicate(what.to_string())
        }
        _ => RepoError::Database(e),
    }
}

/// PostgresRepository
///
/// `Repository` backed by the Postgres content store.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ListFilter) {
        if filter.published_only {
            builder.push(" AND is_published = true");
        }
    }

    fn push_order_and_limit(builder: &mut QueryBuilder<'_, Postgres>, limit: Option<i64>) {
        builder.push(NEWEST_FIRST);
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit.max(0));
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Projects ---

    async fn list_projects(&self, filter: &ListFilter) -> RepoResult<Vec<Project>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE TRUE"));
        Self::push_filter(&mut builder, filter);
        Self::push_order_and_limit(&mut builder, filter.limit);

        Ok(builder
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1");
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_hero_project(&self) -> RepoResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE is_hero = true LIMIT 1");
        Ok(sqlx::query_as::<_, Project>(&sql)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_project(&self, req: CreateProjectRequest) -> RepoResult<Project> {
        let slug = req.slug.unwrap_or_else(|| slugify(&req.title));
        let sql = format!(
            r#"
            INSERT INTO projects (
                id, slug, title, summary, content, year, facts, hero_image_path,
                project_images, image_pairs, is_hero, is_published, published_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, false, $11,
                    CASE WHEN $11 THEN NOW() ELSE NULL END, NOW(), NOW())
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(Uuid::new_v4())
            .bind(slug)
            .bind(req.title)
            .bind(req.summary)
            .bind(req.content)
            .bind(req.year)
            .bind(req.facts.unwrap_or_else(|| json!({})))
            .bind(req.hero_image_path)
            .bind(req.project_images)
            .bind(Json(req.image_pairs))
            .bind(req.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation("project slug"))
    }

    /// Partial update through `COALESCE`; a supplied `is_published` also
    /// derives `published_at`.
    async fn update_project(
        &self,
        id: Uuid,
        req: UpdateProjectRequest,
    ) -> RepoResult<Option<Project>> {
        let sql = format!(
            r#"
            UPDATE projects
            SET slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                summary = COALESCE($4, summary),
                content = COALESCE($5, content),
                year = COALESCE($6, year),
                facts = COALESCE($7, facts),
                hero_image_path = COALESCE($8, hero_image_path),
                project_images = COALESCE($9, project_images),
                image_pairs = COALESCE($10, image_pairs),
                is_published = COALESCE($11, is_published),
                published_at = CASE
                    WHEN $11::boolean IS NULL THEN published_at
                    WHEN $11 THEN COALESCE(published_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(req.slug)
            .bind(req.title)
            .bind(req.summary)
            .bind(req.content)
            .bind(req.year)
            .bind(req.facts)
            .bind(req.hero_image_path)
            .bind(req.project_images)
            .bind(req.image_pairs.map(Json))
            .bind(req.is_published)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_violation("project slug"))
    }

    async fn set_hero_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let mut tx = self.pool.begin().await?;

        // Concurrent changes queue here; the last one to commit wins.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(HERO_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("UPDATE projects SET is_hero = false, updated_at = NOW() WHERE is_hero = true")
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "UPDATE projects SET is_hero = true, updated_at = NOW() WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    async fn delete_project(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- Editorials ---

    async fn list_posts(&self, filter: &ListFilter) -> RepoResult<Vec<Post>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE TRUE"));
        Self::push_filter(&mut builder, filter);
        if let Some(tag) = &filter.tag {
            builder.push(" AND ");
            builder.push_bind(tag.clone());
            builder.push(" = ANY(tags)");
        }
        Self::push_order_and_limit(&mut builder, filter.limit);

        Ok(builder
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_post_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_post(&self, req: CreatePostRequest) -> RepoResult<Post> {
        let slug = req.slug.unwrap_or_else(|| slugify(&req.title));
        let sql = format!(
            r#"
            INSERT INTO posts (
                id, slug, title, excerpt, content, cover_image_path, tags,
                is_published, published_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                    CASE WHEN $8 THEN NOW() ELSE NULL END, NOW(), NOW())
            RETURNING {POST_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(slug)
            .bind(req.title)
            .bind(req.excerpt)
            .bind(req.content)
            .bind(req.cover_image_path)
            .bind(req.tags)
            .bind(req.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation("editorial slug"))
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>> {
        let sql = format!(
            r#"
            UPDATE posts
            SET slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                excerpt = COALESCE($4, excerpt),
                content = COALESCE($5, content),
                cover_image_path = COALESCE($6, cover_image_path),
                tags = COALESCE($7, tags),
                is_published = COALESCE($8, is_published),
                published_at = CASE
                    WHEN $8::boolean IS NULL THEN published_at
                    WHEN $8 THEN COALESCE(published_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(req.slug)
            .bind(req.title)
            .bind(req.excerpt)
            .bind(req.content)
            .bind(req.cover_image_path)
            .bind(req.tags)
            .bind(req.is_published)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_violation("editorial slug"))
    }

    async fn delete_post(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- Listings ---

    async fn list_listings(&self, filter: &ListFilter) -> RepoResult<Vec<Listing>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {LISTING_COLUMNS} FROM listings WHERE TRUE"));
        Self::push_filter(&mut builder, filter);
        if let Some(status) = filter.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }
        Self::push_order_and_limit(&mut builder, filter.limit);

        Ok(builder
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_listing(&self, id: Uuid) -> RepoResult<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");
        Ok(sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_listing_by_slug(&self, slug: &str) -> RepoResult<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE slug = $1");
        Ok(sqlx::query_as::<_, Listing>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_listing(&self, req: CreateListingRequest) -> RepoResult<Listing> {
        let slug = req.slug.unwrap_or_else(|| slugify(&req.title));
        let sql = format!(
            r#"
            INSERT INTO listings (
                id, slug, title, subtitle, description, facts, location, status,
                hero_image_path, hero_video_url, brochure_pdf_path,
                is_published, published_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    CASE WHEN $12 THEN NOW() ELSE NULL END, NOW(), NOW())
            RETURNING {LISTING_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Listing>(&sql)
            .bind(Uuid::new_v4())
            .bind(slug)
            .bind(req.title)
            .bind(req.subtitle)
            .bind(req.description)
            .bind(req.facts.unwrap_or_else(|| json!({})))
            .bind(req.location)
            .bind(req.status.as_str())
            .bind(req.hero_image_path)
            .bind(req.hero_video_url)
            .bind(req.brochure_pdf_path)
            .bind(req.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation("listing slug"))
    }

    async fn update_listing(
        &self,
        id: Uuid,
        req: UpdateListingRequest,
    ) -> RepoResult<Option<Listing>> {
        let sql = format!(
            r#"
            UPDATE listings
            SET slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                subtitle = COALESCE($4, subtitle),
                description = COALESCE($5, description),
                facts = COALESCE($6, facts),
                location = COALESCE($7, location),
                status = COALESCE($8, status),
                hero_image_path = COALESCE($9, hero_image_path),
                hero_video_url = COALESCE($10, hero_video_url),
                brochure_pdf_path = COALESCE($11, brochure_pdf_path),
                is_published = COALESCE($12, is_published),
                published_at = CASE
                    WHEN $12::boolean IS NULL THEN published_at
                    WHEN $12 THEN COALESCE(published_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LISTING_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .bind(req.slug)
            .bind(req.title)
            .bind(req.subtitle)
            .bind(req.description)
            .bind(req.facts)
            .bind(req.location)
            .bind(req.status.map(|s| s.as_str()))
            .bind(req.hero_image_path)
            .bind(req.hero_video_url)
            .bind(req.brochure_pdf_path)
            .bind(req.is_published)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_violation("listing slug"))
    }

    async fn delete_listing(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- Publish workflow ---

    /// `updated_at` only moves when the state actually changes, so repeating a
    /// toggle leaves the row untouched.
    async fn set_published(
        &self,
        kind: ContentKind,
        id: Uuid,
        publish: bool,
    ) -> RepoResult<Option<PublishState>> {
        let sql = format!(
            r#"
            UPDATE {table}
            SET published_at = CASE WHEN $2 THEN COALESCE(published_at, NOW()) ELSE NULL END,
                updated_at = CASE WHEN is_published IS DISTINCT FROM $2 THEN NOW() ELSE updated_at END,
                is_published = $2
            WHERE id = $1
            RETURNING id, is_published, published_at
            "#,
            table = kind.table()
        );

        Ok(sqlx::query_as::<_, PublishState>(&sql)
            .bind(id)
            .bind(publish)
            .fetch_optional(&self.pool)
            .await?)
    }

    // --- Enquiries ---

    async fn create_enquiry(&self, enquiry: NewEnquiry) -> RepoResult<Enquiry> {
        let sql = format!(
            "INSERT INTO enquiries (id, name, email, phone, message, context, source, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) RETURNING {ENQUIRY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Enquiry>(&sql)
            .bind(Uuid::new_v4())
            .bind(enquiry.name)
            .bind(enquiry.email)
            .bind(enquiry.phone)
            .bind(enquiry.message)
            .bind(enquiry.context)
            .bind(enquiry.source)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_enquiries(&self) -> RepoResult<Vec<Enquiry>> {
        let sql = format!("SELECT {ENQUIRY_COLUMNS} FROM enquiries ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Enquiry>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_enquiry(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM enquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- Site settings ---

    async fn list_settings(&self) -> RepoResult<Vec<SiteSetting>> {
        let sql = format!("SELECT {SETTING_COLUMNS} FROM site_settings ORDER BY key_name");
        Ok(sqlx::query_as::<_, SiteSetting>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_setting(&self, key: &str) -> RepoResult<Option<SiteSetting>> {
        let sql = format!("SELECT {SETTING_COLUMNS} FROM site_settings WHERE key_name = $1");
        Ok(sqlx::query_as::<_, SiteSetting>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Insert or replace; a missing description keeps the stored one.
    async fn upsert_setting(
        &self,
        key: &str,
        value: Value,
        description: Option<String>,
    ) -> RepoResult<SiteSetting> {
        let sql = format!(
            r#"
            INSERT INTO site_settings (key_name, value, description, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key_name) DO UPDATE
            SET value = EXCLUDED.value,
                description = COALESCE(EXCLUDED.description, site_settings.description),
                updated_at = NOW()
            RETURNING {SETTING_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, SiteSetting>(&sql)
            .bind(key)
            .bind(value)
            .bind(description)
            .fetch_one(&self.pool)
            .await?)
    }

    // --- Profiles ---

    async fn get_profile(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_profiles(&self) -> RepoResult<Vec<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_profile_role(&self, user_id: Uuid, role: Role) -> RepoResult<Option<Profile>> {
        let sql = format!(
            "UPDATE profiles SET role = $2 WHERE user_id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    // --- Instagram mirror ---

    async fn list_instagram(&self, limit: Option<i64>) -> RepoResult<Vec<InstagramPost>> {
        // LIMIT NULL returns every row.
        let sql = format!(
            r#"SELECT {INSTAGRAM_COLUMNS} FROM instagram_cache ORDER BY "timestamp" DESC LIMIT $1"#
        );
        Ok(sqlx::query_as::<_, InstagramPost>(&sql)
            .bind(limit.map(|l| l.max(0)))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn replace_instagram_cache(&self, posts: Vec<InstagramPost>) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM instagram_cache")
            .execute(&mut *tx)
            .await?;

        let count = posts.len() as u64;
        for batch in posts.chunks(INSTAGRAM_BATCH_ROWS) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO instagram_cache ({INSTAGRAM_COLUMNS}) "));
            builder.push_values(batch, |mut row, post| {
                row.push_bind(&post.id)
                    .push_bind(&post.media_url)
                    .push_bind(&post.permalink)
                    .push_bind(&post.caption)
                    .push_bind(&post.media_type)
                    .push_bind(post.timestamp);
            });
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(unique_violation("instagram post id"))?;
        }

        tx.commit().await?;
        Ok(count)
    }

    // --- Maintenance ---

    async fn cleanup_legacy_content(&self, prefix: &str) -> RepoResult<CleanupReport> {
        let mut tx = self.pool.begin().await?;

        let projects = sqlx::query_as::<_, RemovedItem>(
            "DELETE FROM projects WHERE starts_with(hero_image_path, $1) RETURNING id, slug",
        )
        .bind(prefix)
        .fetch_all(&mut *tx)
        .await?;

        let posts = sqlx::query_as::<_, RemovedItem>(
            "DELETE FROM posts WHERE starts_with(cover_image_path, $1) RETURNING id, slug",
        )
        .bind(prefix)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let total = (projects.len() + posts.len()) as u64;
        Ok(CleanupReport {
            projects,
            posts,
            total,
        })
    }

    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        Ok(sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM projects) AS total_projects,
                (SELECT COUNT(*) FROM projects WHERE is_published) AS published_projects,
                (SELECT COUNT(*) FROM posts) AS total_editorials,
                (SELECT COUNT(*) FROM posts WHERE is_published) AS published_editorials,
                (SELECT COUNT(*) FROM listings) AS total_listings,
                (SELECT COUNT(*) FROM enquiries) AS total_enquiries
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }
}
