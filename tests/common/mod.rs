#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use estate_cms::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, create_router,
    models::{Profile, Role},
    repository::RepositoryState,
    storage::StorageState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Router wired to an in-memory repository and mock storage, with one admin
/// and one editor profile.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub storage: MockStorageService,
    pub config: AppConfig,
    pub admin: Uuid,
    pub editor: Uuid,
}

pub fn profile(role: Role) -> Profile {
    Profile {
        user_id: Uuid::new_v4(),
        email: Some(format!("{}@estate.test", role)),
        role,
        created_at: Utc::now(),
    }
}

pub fn test_app() -> TestApp {
    test_app_with(MockStorageService::new(), AppConfig::default())
}

pub fn test_app_with(storage: MockStorageService, config: AppConfig) -> TestApp {
    let admin = profile(Role::Admin);
    let editor = profile(Role::Editor);
    let (admin_id, editor_id) = (admin.user_id, editor.user_id);

    let repo = Arc::new(InMemoryRepository::with_profiles(vec![admin, editor]));
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        storage: Arc::new(storage.clone()) as StorageState,
        config: config.clone(),
    };

    TestApp {
        router: create_router(state),
        repo,
        storage,
        config,
        admin: admin_id,
        editor: editor_id,
    }
}

/// Router over an explicit repository, for failure-mode tests.
pub fn router_with_repo(repo: RepositoryState) -> Router {
    create_router(AppState {
        repo,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config: AppConfig::default(),
    })
}

/// Sends one request through the router. `user` authenticates through the
/// local `x-user-id` header. Non-JSON bodies decode to `Value::Null`.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    call(router, request).await
}

pub async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
