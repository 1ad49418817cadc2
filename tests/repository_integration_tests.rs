//! Postgres repository tests. They need a disposable database:
//!
//! DATABASE_URL=postgres://... cargo test --test repository_integration_tests -- --ignored

use chrono::{Duration, Utc};
use estate_cms::{
    PostgresRepository,
    content::{ContentKind, LEGACY_IMAGE_PREFIX},
    error::RepoError,
    models::{
        CreatePostRequest, CreateProjectRequest, ImagePair, InstagramPost, NewEnquiry, Role,
        UpdateProjectRequest,
    },
    repository::{ListFilter, Repository},
};
use serde_json::json;
use serial_test::serial;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

async fn setup() -> (PostgresRepository, PgPool) {
    dotenv::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres in tests");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");
    sqlx::query(
        "TRUNCATE projects, posts, listings, enquiries, site_settings, profiles, instagram_cache",
    )
    .execute(&pool)
    .await
    .unwrap();

    (PostgresRepository::new(pool.clone()), pool)
}

fn project(title: &str, published: bool) -> CreateProjectRequest {
    CreateProjectRequest {
        slug: Some(estate_cms::content::slugify(title)),
        title: title.to_string(),
        is_published: published,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_project_crud_round_trip() {
    let (repo, _pool) = setup().await;
    let created = repo
        .create_project(CreateProjectRequest {
            facts: Some(json!({ "units": 12 })),
            project_images: vec!["projects/1.jpg".to_string(), "projects/2.jpg".to_string()],
            image_pairs: vec![ImagePair {
                left: "projects/l.jpg".to_string(),
                right: "projects/r.jpg".to_string(),
                caption: Some("Before and after".to_string()),
            }],
            ..project("Harbour House", false)
        })
        .await
        .unwrap();
    assert!(created.published_at.is_none());
    assert_eq!(created.image_pairs.len(), 1);

    let updated = repo
        .update_project(
            created.id,
            UpdateProjectRequest {
                summary: Some("Twelve homes by the water".to_string()),
                is_published: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Harbour House");
    assert_eq!(updated.facts["units"], 12);
    assert_eq!(updated.project_images.len(), 2);
    assert!(updated.published_at.is_some());

    let by_slug = repo.get_project_by_slug("harbour-house").await.unwrap();
    assert_eq!(by_slug.unwrap().id, created.id);

    assert!(repo.delete_project(created.id).await.unwrap());
    assert!(!repo.delete_project(created.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_duplicate_slug_maps_to_duplicate() {
    let (repo, _pool) = setup().await;
    repo.create_project(project("Twin", false)).await.unwrap();
    let err = repo.create_project(project("Twin", false)).await.unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_publish_toggle_semantics() {
    let (repo, _pool) = setup().await;
    let post = repo
        .create_post(CreatePostRequest {
            slug: Some("journal".to_string()),
            title: "Journal".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let on = repo
        .set_published(ContentKind::Editorials, post.id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(on.published_at.is_some());

    let again = repo
        .set_published(ContentKind::Editorials, post.id, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.published_at, on.published_at);

    let off = repo
        .set_published(ContentKind::Editorials, post.id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(off.published_at.is_none());

    let missing = repo
        .set_published(ContentKind::Listings, Uuid::new_v4(), true)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_single_hero() {
    let (repo, _pool) = setup().await;
    let a = repo.create_project(project("Hero A", true)).await.unwrap();
    let b = repo.create_project(project("Hero B", true)).await.unwrap();

    repo.set_hero_project(a.id).await.unwrap().unwrap();
    repo.set_hero_project(b.id).await.unwrap().unwrap();
    assert!(repo.set_hero_project(Uuid::new_v4()).await.unwrap().is_none());

    let heroes: Vec<_> = repo
        .list_projects(&ListFilter::default())
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.is_hero)
        .collect();
    assert_eq!(heroes.len(), 1);
    assert_eq!(heroes[0].id, b.id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_concurrent_hero_changes_leave_one_hero() {
    let (repo, _pool) = setup().await;
    let first = repo.create_project(project("Hero One", true)).await.unwrap();
    let second = repo.create_project(project("Hero Two", true)).await.unwrap();
    repo.set_hero_project(first.id).await.unwrap().unwrap();

    for _ in 0..10 {
        let (a, b) = tokio::join!(
            repo.set_hero_project(first.id),
            repo.set_hero_project(second.id)
        );
        assert!(a.unwrap().is_some());
        assert!(b.unwrap().is_some());

        let heroes = repo
            .list_projects(&ListFilter::default())
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.is_hero)
            .count();
        assert_eq!(heroes, 1);
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_filters_and_limits() {
    let (repo, _pool) = setup().await;
    repo.create_project(project("Hidden", false)).await.unwrap();
    repo.create_project(project("Shown One", true)).await.unwrap();
    repo.create_project(project("Shown Two", true)).await.unwrap();

    let public = repo.list_projects(&ListFilter::public()).await.unwrap();
    assert_eq!(public.len(), 2);
    let limited = repo
        .list_projects(&ListFilter::public().with_limit(Some(1)))
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);

    repo.create_post(CreatePostRequest {
        slug: Some("tagged".to_string()),
        title: "Tagged".to_string(),
        tags: vec!["interiors".to_string()],
        is_published: true,
        ..Default::default()
    })
    .await
    .unwrap();
    let filter = ListFilter {
        tag: Some("interiors".to_string()),
        ..ListFilter::public()
    };
    assert_eq!(repo.list_posts(&filter).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_instagram_refresh() {
    let (repo, _pool) = setup().await;
    let post = |id: &str, hours: i64| InstagramPost {
        id: id.to_string(),
        media_url: format!("https://cdn.example.com/{id}.jpg"),
        permalink: format!("https://instagram.com/p/{id}"),
        caption: Some("caption".to_string()),
        media_type: "IMAGE".to_string(),
        timestamp: Utc::now() - Duration::hours(hours),
    };

    assert_eq!(
        repo.replace_instagram_cache(vec![post("a", 2), post("b", 1)])
            .await
            .unwrap(),
        2
    );
    let cached = repo.list_instagram(None).await.unwrap();
    assert_eq!(cached[0].id, "b");

    assert_eq!(repo.replace_instagram_cache(vec![]).await.unwrap(), 0);
    assert!(repo.list_instagram(Some(5)).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_instagram_refresh_of_many_posts() {
    let (repo, _pool) = setup().await;
    let now = Utc::now();
    let posts: Vec<InstagramPost> = (0..12_000)
        .map(|i| InstagramPost {
            id: format!("media-{i}"),
            media_url: format!("https://cdn.example.com/{i}.jpg"),
            permalink: format!("https://instagram.com/p/{i}"),
            caption: None,
            media_type: "IMAGE".to_string(),
            timestamp: now - Duration::minutes(i),
        })
        .collect();

    assert_eq!(repo.replace_instagram_cache(posts).await.unwrap(), 12_000);
    assert_eq!(repo.list_instagram(None).await.unwrap().len(), 12_000);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
#[serial]
async fn test_cleanup_settings_profiles_and_stats() {
    let (repo, pool) = setup().await;
    repo.create_project(CreateProjectRequest {
        hero_image_path: Some(format!("{LEGACY_IMAGE_PREFIX}old.jpg")),
        ..project("Legacy", true)
    })
    .await
    .unwrap();
    repo.create_project(project("Current", true)).await.unwrap();

    let report = repo.cleanup_legacy_content(LEGACY_IMAGE_PREFIX).await.unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.projects[0].slug, "legacy");
    assert_eq!(
        repo.cleanup_legacy_content(LEGACY_IMAGE_PREFIX)
            .await
            .unwrap()
            .total,
        0
    );

    repo.upsert_setting("content_limits", json!({ "projects": 4 }), Some("Homepage".into()))
        .await
        .unwrap();
    let setting = repo
        .upsert_setting("content_limits", json!({ "projects": 5 }), None)
        .await
        .unwrap();
    assert_eq!(setting.value["projects"], 5);
    assert_eq!(setting.description.as_deref(), Some("Homepage"));

    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (user_id, email, role) VALUES ($1, 'ed@estate.test', 'editor')")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();
    let promoted = repo
        .set_profile_role(user_id, Role::Admin)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    repo.create_enquiry(NewEnquiry {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        phone: None,
        message: "Hello".to_string(),
        context: json!({ "listingSlug": "mews" }),
        source: "website".to_string(),
    })
    .await
    .unwrap();

    let stats = repo.get_stats().await.unwrap();
    assert_eq!(stats.total_projects, 1);
    assert_eq!(stats.published_projects, 1);
    assert_eq!(stats.total_enquiries, 1);
}
