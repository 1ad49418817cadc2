mod common;

use axum::http::{Method, StatusCode};
use common::{send, test_app};
use estate_cms::{
    content::CONTENT_LIMITS_KEY,
    models::CreateProjectRequest,
    repository::{ListFilter, Repository},
};
use serde_json::{Value, json};
use uuid::Uuid;

async fn create_project(app: &common::TestApp, body: Value) -> Value {
    let (status, json) = send(
        &app.router,
        Method::POST,
        "/admin/projects",
        Some(app.admin),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    assert_eq!(json["success"], true);
    json["project"].clone()
}

// --- Publish workflow ---

#[tokio::test]
async fn test_publish_toggle_derives_published_at() {
    let app = test_app();
    let project = create_project(&app, json!({ "title": "Harbour House" })).await;
    assert_eq!(project["isPublished"], false);
    assert!(project["publishedAt"].is_null());
    let id = project["id"].as_str().unwrap();
    let uri = format!("/admin/content/projects/{id}/publish");

    // false -> true stamps a publication date
    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.editor),
        Some(json!({ "isPublished": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["item"]["isPublished"], true);
    let first_stamp = json["item"]["publishedAt"].clone();
    assert!(first_stamp.is_string());

    // true -> true keeps the original date
    let (_, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.editor),
        Some(json!({ "isPublished": true })),
    )
    .await;
    assert_eq!(json["item"]["publishedAt"], first_stamp);

    // true -> false clears it
    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.editor),
        Some(json!({ "isPublished": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["item"]["isPublished"], false);
    assert!(json["item"]["publishedAt"].is_null());
}

#[tokio::test]
async fn test_publish_unknown_row_and_kind() {
    let app = test_app();

    let uri = format!("/admin/content/listings/{}/publish", Uuid::new_v4());
    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.admin),
        Some(json!({ "isPublished": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "listing not found");

    let uri = format!("/admin/content/villas/{}/publish", Uuid::new_v4());
    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.admin),
        Some(json!({ "isPublished": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_update_with_is_published_follows_toggle_rules() {
    let app = test_app();
    let editorial = {
        let (status, json) = send(
            &app.router,
            Method::POST,
            "/admin/editorials",
            Some(app.editor),
            Some(json!({ "title": "Living with Light", "isPublished": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json["editorial"].clone()
    };
    assert!(editorial["publishedAt"].is_string());

    let uri = format!("/admin/editorials/{}", editorial["id"].as_str().unwrap());
    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.editor),
        Some(json!({ "isPublished": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["editorial"]["publishedAt"].is_null());
    assert_eq!(json["editorial"]["title"], "Living with Light");
}

// --- Hero selection ---

#[tokio::test]
async fn test_hero_selection_leaves_exactly_one_hero() {
    let app = test_app();
    let a = create_project(&app, json!({ "title": "Project A", "isPublished": true })).await;
    let b = create_project(&app, json!({ "title": "Project B", "isPublished": true })).await;

    for project in [&a, &b] {
        let uri = format!("/admin/projects/{}/hero", project["id"].as_str().unwrap());
        let (status, json) = send(&app.router, Method::PUT, &uri, Some(app.admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["project"]["isHero"], true);
    }

    let all = app.repo.list_projects(&ListFilter::default()).await.unwrap();
    let heroes: Vec<_> = all.iter().filter(|p| p.is_hero).collect();
    assert_eq!(heroes.len(), 1);
    assert_eq!(heroes[0].slug, "project-b");

    let (status, json) = send(&app.router, Method::GET, "/projects/hero", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["project"]["slug"], "project-b");
}

#[tokio::test]
async fn test_hero_unknown_id_touches_nothing() {
    let app = test_app();
    let a = create_project(&app, json!({ "title": "Project A" })).await;
    let uri = format!("/admin/projects/{}/hero", a["id"].as_str().unwrap());
    send(&app.router, Method::PUT, &uri, Some(app.admin), None).await;

    let uri = format!("/admin/projects/{}/hero", Uuid::new_v4());
    let (status, _) = send(&app.router, Method::PUT, &uri, Some(app.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let hero = app.repo.get_hero_project().await.unwrap().unwrap();
    assert_eq!(hero.slug, "project-a");
}

#[tokio::test]
async fn test_unpublished_hero_is_not_public() {
    let app = test_app();
    let a = create_project(&app, json!({ "title": "Quiet Draft" })).await;
    let uri = format!("/admin/projects/{}/hero", a["id"].as_str().unwrap());
    send(&app.router, Method::PUT, &uri, Some(app.admin), None).await;

    let (status, _) = send(&app.router, Method::GET, "/projects/hero", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- CRUD ---

#[tokio::test]
async fn test_delete_unknown_id_returns_404_and_keeps_rows() {
    let app = test_app();
    create_project(&app, json!({ "title": "Keeper" })).await;

    for kind in ["projects", "editorials", "listings"] {
        let uri = format!("/admin/{kind}/{}", Uuid::new_v4());
        let (status, json) = send(&app.router, Method::DELETE, &uri, Some(app.admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{kind}");
        assert!(json["error"].is_string());
    }

    let all = app.repo.list_projects(&ListFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_delete_existing_project() {
    let app = test_app();
    let project = create_project(&app, json!({ "title": "Short Lived" })).await;
    let uri = format!("/admin/projects/{}", project["id"].as_str().unwrap());

    let (status, json) = send(&app.router, Method::DELETE, &uri, Some(app.editor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], project["id"]);

    let (status, _) = send(&app.router, Method::GET, &uri, Some(app.editor), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_derives_slug_and_rejects_duplicates() {
    let app = test_app();
    let project = create_project(&app, json!({ "title": "  Villa Rosa, Phase 2 " })).await;
    assert_eq!(project["slug"], "villa-rosa-phase-2");
    assert_eq!(project["title"], "Villa Rosa, Phase 2");
    assert_eq!(project["facts"], json!({}));

    let (status, json) = send(
        &app.router,
        Method::POST,
        "/admin/projects",
        Some(app.admin),
        Some(json!({ "title": "Another", "slug": "villa-rosa-phase-2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "project slug already exists");
}

#[tokio::test]
async fn test_create_rejects_blank_title_and_malformed_json() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        Method::POST,
        "/admin/listings",
        Some(app.admin),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "title is required");

    let (status, json) = send(
        &app.router,
        Method::POST,
        "/admin/listings",
        Some(app.admin),
        Some(json!({ "title": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_partial_update_keeps_absent_fields() {
    let app = test_app();
    let (_, json) = send(
        &app.router,
        Method::POST,
        "/admin/listings",
        Some(app.admin),
        Some(json!({
            "title": "Garden Flat",
            "location": "Ranelagh",
            "status": "coming_soon",
            "facts": { "beds": 2 }
        })),
    )
    .await;
    let uri = format!("/admin/listings/{}", json["listing"]["id"].as_str().unwrap());

    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.admin),
        Some(json!({ "status": "under_offer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listing = &json["listing"];
    assert_eq!(listing["status"], "under_offer");
    assert_eq!(listing["location"], "Ranelagh");
    assert_eq!(listing["facts"]["beds"], 2);
    assert_eq!(listing["slug"], "garden-flat");
}

#[tokio::test]
async fn test_drafts_are_hidden_from_public_routes() {
    let app = test_app();
    create_project(&app, json!({ "title": "Draft Project" })).await;
    create_project(&app, json!({ "title": "Live Project", "isPublished": true })).await;

    let (status, json) = send(&app.router, Method::GET, "/projects", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = json["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["live-project"]);

    let (status, _) = send(&app.router, Method::GET, "/projects/draft-project", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app.router, Method::GET, "/projects/live-project", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["project"]["title"], "Live Project");

    let (_, json) = send(&app.router, Method::GET, "/admin/projects", Some(app.editor), None).await;
    assert_eq!(json["projects"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_editorial_tags_are_normalized_and_filterable() {
    let app = test_app();
    for (title, tags) in [
        ("Stone and Timber", json!([" materials ", "craft", "materials", ""])),
        ("City Living", json!(["urban"])),
    ] {
        let (status, _) = send(
            &app.router,
            Method::POST,
            "/admin/editorials",
            Some(app.editor),
            Some(json!({ "title": title, "tags": tags, "isPublished": true })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, json) = send(&app.router, Method::GET, "/editorials?tag=materials", None, None).await;
    let posts = json["editorials"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["tags"], json!(["materials", "craft"]));

    let (_, json) = send(&app.router, Method::GET, "/editorials?limit=1", None, None).await;
    assert_eq!(json["editorials"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_status_filter() {
    let app = test_app();
    for (title, status) in [("Sold One", "sold"), ("For Sale One", "for_sale")] {
        send(
            &app.router,
            Method::POST,
            "/admin/listings",
            Some(app.admin),
            Some(json!({ "title": title, "status": status, "isPublished": true })),
        )
        .await;
    }

    let (status, json) = send(&app.router, Method::GET, "/listings?status=sold", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listings = json["listings"].as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["slug"], "sold-one");

    let (status, json) = send(&app.router, Method::GET, "/listings?status=rented", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_malformed_path_and_query_answer_error_envelope() {
    let app = test_app();
    let cases = [
        (Method::DELETE, "/admin/projects/not-a-uuid"),
        (Method::GET, "/admin/editorials/42"),
        (Method::DELETE, "/admin/enquiries/nope"),
        (Method::PUT, "/admin/projects/xyz/hero"),
        (Method::GET, "/listings?status=bogus"),
        (Method::GET, "/projects?limit=abc"),
        (Method::GET, "/instagram?limit=many"),
    ];

    for (method, uri) in cases {
        let (status, json) = send(&app.router, method, uri, Some(app.admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(json["error"].is_string(), "{uri} answered {json}");
    }
}

#[tokio::test]
async fn test_update_unknown_project_with_taken_slug_is_not_found() {
    let app = test_app();
    create_project(&app, json!({ "title": "Taken" })).await;

    let uri = format!("/admin/projects/{}", Uuid::new_v4());
    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.admin),
        Some(json!({ "slug": "taken" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_unrelated_query_params_are_ignored() {
    let app = test_app();
    create_project(&app, json!({ "title": "Quay", "isPublished": true })).await;

    let (status, json) = send(&app.router, Method::GET, "/projects?status=sold", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["projects"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app.router, Method::GET, "/editorials?status=sold", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

// --- Enquiries ---

#[tokio::test]
async fn test_enquiry_without_email_is_rejected_and_not_stored() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        Method::POST,
        "/enquiries",
        None,
        Some(json!({ "name": "Ada", "message": "Viewing please" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "email is required");

    assert!(app.repo.list_enquiries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_enquiry_packs_optional_fields_into_context() {
    let app = test_app();
    let (status, json) = send(
        &app.router,
        Method::POST,
        "/enquiries",
        None,
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Is the garden south facing?",
            "listingSlug": "garden-flat",
            "budget": "  ",
            "context": { "page": "/listings/garden-flat" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    let id: Uuid = serde_json::from_value(json["id"].clone()).unwrap();

    let stored = app.repo.list_enquiries().await.unwrap();
    assert_eq!(stored.len(), 1);
    let enquiry = &stored[0];
    assert_eq!(enquiry.id, id);
    assert_eq!(enquiry.source, "website");
    assert_eq!(enquiry.context["listingSlug"], "garden-flat");
    assert_eq!(enquiry.context["page"], "/listings/garden-flat");
    assert!(enquiry.context.get("budget").is_none());
}

#[tokio::test]
async fn test_enquiry_admin_routes() {
    let app = test_app();
    send(
        &app.router,
        Method::POST,
        "/enquiries",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "message": "Hello" })),
    )
    .await;

    let (status, _) = send(&app.router, Method::GET, "/admin/enquiries", Some(app.editor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app.router, Method::GET, "/admin/enquiries", Some(app.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let id = json["enquiries"][0]["id"].as_str().unwrap().to_string();

    let uri = format!("/admin/enquiries/{id}");
    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(app.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(app.admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Authorization ---

#[tokio::test]
async fn test_anonymous_and_editor_access() {
    let app = test_app();

    let (status, json) = send(&app.router, Method::GET, "/admin/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");

    let admin_only = [
        (Method::GET, "/admin/profiles", None),
        (Method::POST, "/admin/instagram/sync", Some(json!({ "posts": [] }))),
        (Method::POST, "/admin/maintenance/cleanup", None),
        (
            Method::PUT,
            "/admin/settings/content_limits",
            Some(json!({ "value": { "projects": 1 } })),
        ),
        (Method::DELETE, "/admin/storage/objects?path=a.png", None),
    ];
    for (method, uri, body) in admin_only {
        let (status, _) = send(&app.router, method, uri, Some(app.editor), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }

    let (status, _) = send(&app.router, Method::GET, "/admin/stats", Some(app.editor), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_role_management() {
    let app = test_app();
    let uri = format!("/admin/profiles/{}/role", app.editor);
    let (status, json) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.admin),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["profile"]["role"], "admin");

    let uri = format!("/admin/profiles/{}/role", app.admin);
    let (status, _) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.admin),
        Some(json!({ "role": "editor" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/admin/profiles/{}/role", Uuid::new_v4());
    let (status, _) = send(
        &app.router,
        Method::PUT,
        &uri,
        Some(app.admin),
        Some(json!({ "role": "editor" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Instagram, settings, maintenance ---

fn instagram_post(id: &str, hours_ago: i64) -> Value {
    json!({
        "id": id,
        "mediaUrl": format!("https://cdn.example.com/{id}.jpg"),
        "permalink": format!("https://instagram.com/p/{id}"),
        "caption": null,
        "mediaType": "IMAGE",
        "timestamp": (chrono::Utc::now() - chrono::Duration::hours(hours_ago)).to_rfc3339(),
    })
}

#[tokio::test]
async fn test_instagram_sync_replaces_cache() {
    let app = test_app();
    let posts = json!([instagram_post("a", 3), instagram_post("b", 1), instagram_post("c", 2)]);

    let (status, json) = send(
        &app.router,
        Method::POST,
        "/admin/instagram/sync",
        Some(app.admin),
        Some(json!({ "posts": posts })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 3);

    let (_, json) = send(&app.router, Method::GET, "/instagram", None, None).await;
    let ids: Vec<&str> = json["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["b", "c", "a"]);

    let (_, json) = send(
        &app.router,
        Method::POST,
        "/admin/instagram/sync",
        Some(app.admin),
        Some(json!({ "posts": [] })),
    )
    .await;
    assert_eq!(json["count"], 0);
    let (_, json) = send(&app.router, Method::GET, "/instagram", None, None).await;
    assert!(json["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_instagram_sync_rejects_duplicate_ids() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/admin/instagram/sync",
        Some(app.admin),
        Some(json!({ "posts": [instagram_post("a", 1), instagram_post("a", 2)] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_content_limits_fallback_and_override() {
    let app = test_app();

    let (_, json) = send(&app.router, Method::GET, "/settings/content-limits", None, None).await;
    assert_eq!(json["limits"], json!({ "projects": 6, "editorials": 3, "instagram": 8 }));

    app.repo
        .upsert_setting(CONTENT_LIMITS_KEY, json!("not json at all"), None)
        .await
        .unwrap();
    let (_, json) = send(&app.router, Method::GET, "/settings/content-limits", None, None).await;
    assert_eq!(json["limits"]["projects"], 6);

    let (status, _) = send(
        &app.router,
        Method::PUT,
        "/admin/settings/content_limits",
        Some(app.admin),
        Some(json!({ "value": { "projects": 2 }, "description": "Homepage counts" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = send(&app.router, Method::GET, "/settings/content-limits", None, None).await;
    assert_eq!(json["limits"], json!({ "projects": 2, "editorials": 3, "instagram": 8 }));

    let (status, json) = send(
        &app.router,
        Method::GET,
        "/admin/settings/content_limits",
        Some(app.editor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["setting"]["description"], "Homepage counts");
}

#[tokio::test]
async fn test_home_respects_limits_and_drafts() {
    let app = test_app();
    app.repo
        .upsert_setting(CONTENT_LIMITS_KEY, json!({ "projects": 2 }), None)
        .await
        .unwrap();
    for i in 0..3 {
        create_project(&app, json!({ "title": format!("Published {i}"), "isPublished": true }))
            .await;
    }
    create_project(&app, json!({ "title": "Hidden" })).await;

    let (status, json) = send(&app.router, Method::GET, "/home", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["hero"].is_null());
    assert_eq!(json["projects"].as_array().unwrap().len(), 2);
    assert!(json["editorials"].as_array().unwrap().is_empty());
    assert_eq!(json["limits"]["projects"], 2);
}

#[tokio::test]
async fn test_cleanup_removes_legacy_rows_once() {
    let app = test_app();
    let legacy = CreateProjectRequest {
        slug: Some("old-site".to_string()),
        title: "Old Site".to_string(),
        hero_image_path: Some("/images/old-site.jpg".to_string()),
        ..Default::default()
    };
    app.repo.create_project(legacy).await.unwrap();
    create_project(
        &app,
        json!({ "title": "New Site", "heroImagePath": "projects/new-site.jpg" }),
    )
    .await;

    let (status, json) = send(
        &app.router,
        Method::POST,
        "/admin/maintenance/cleanup",
        Some(app.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["report"]["total"], 1);
    assert_eq!(json["report"]["projects"][0]["slug"], "old-site");

    let (_, json) = send(
        &app.router,
        Method::POST,
        "/admin/maintenance/cleanup",
        Some(app.admin),
        None,
    )
    .await;
    assert_eq!(json["report"]["total"], 0);

    let remaining = app.repo.list_projects(&ListFilter::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].slug, "new-site");
}

#[tokio::test]
async fn test_editorial_draft_is_generated_not_stored() {
    let app = test_app();
    let body = json!({ "title": "Coastal Homes", "location": "Dalkey", "keywords": ["light", "stone"] });
    let (status, first) = send(
        &app.router,
        Method::POST,
        "/admin/editorials/draft",
        Some(app.editor),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["draft"]["slug"], "coastal-homes");
    assert!(first["draft"]["content"].as_str().unwrap().contains("Dalkey"));

    let (_, second) = send(
        &app.router,
        Method::POST,
        "/admin/editorials/draft",
        Some(app.editor),
        Some(body),
    )
    .await;
    assert_eq!(first, second);

    assert!(app.repo.list_posts(&ListFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_stats_counts_rows() {
    let app = test_app();
    create_project(&app, json!({ "title": "One", "isPublished": true })).await;
    create_project(&app, json!({ "title": "Two" })).await;

    let (status, json) = send(&app.router, Method::GET, "/admin/stats", Some(app.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stats"]["totalProjects"], 2);
    assert_eq!(json["stats"]["publishedProjects"], 1);
    assert_eq!(json["stats"]["totalEnquiries"], 0);
}
