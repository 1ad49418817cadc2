use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use s3::primitives::ByteStream;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{ExtensionUsage, StorageStats};

/// Fixed bucket quota the usage report is measured against (1 GiB).
pub const STORAGE_QUOTA_BYTES: u64 = 1024 * 1024 * 1024;

// Presigned upload URLs are valid for 10 minutes.
const PRESIGNED_URL_TTL: Duration = Duration::from_secs(600);

/// StorageError
///
/// Any failure reported by the object store, surfaced as-is.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// StoredObject
///
/// One object in the bucket as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
}

/// StorageService
///
/// Contract for the image bucket. The content store only keeps the object
/// key; everything about the bytes lives behind this trait.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the bucket when missing. Used at local startup against MinIO.
    async fn ensure_bucket_exists(&self);

    /// Signed URL allowing a client to PUT `key` directly, constrained to `content_type`.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn upload_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;

    /// Every object in the bucket, across all pages.
    async fn list_objects(&self) -> Result<Vec<StoredObject>, StorageError>;

    /// Public URL clients use to fetch `key`.
    fn public_url(&self, key: &str) -> String;
}

/// S3StorageClient
///
/// AWS SDK client talking to MinIO locally and Supabase Storage in production.
/// Path-style addressing is required by both gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_base_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket fails harmlessly when the bucket already exists.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "create_bucket skipped");
        }
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let presigning =
            PresigningConfig::expires_in(PRESIGNED_URL_TTL).map_err(|e| StorageError(e.to_string()))?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError(e.to_string()))?;

        Ok(presigned_req.uri().to_string())
    }

    async fn upload_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError(e.to_string()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError(e.to_string()))?;
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError(e.to_string()))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    objects.push(StoredObject {
                        key: key.to_string(),
                        size: object.size().unwrap_or(0).max(0) as u64,
                    });
                }
            }
        }

        Ok(objects)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket_name, key)
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments from a caller-supplied key or folder.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Lowercase extension of an object key, `other` when it has none.
pub fn extension_of(key: &str) -> String {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => "other".to_string(),
    }
}

impl StorageStats {
    /// Aggregates a bucket listing against `quota_bytes`.
    pub fn from_objects(objects: &[StoredObject], quota_bytes: u64) -> Self {
        let mut by_extension: BTreeMap<String, ExtensionUsage> = BTreeMap::new();
        let mut total_bytes = 0u64;
        let mut total_files = 0u64;

        // Keys ending in '/' are folder markers, not files.
        for object in objects.iter().filter(|o| !o.key.ends_with('/')) {
            total_bytes += object.size;
            total_files += 1;
            let usage = by_extension.entry(extension_of(&object.key)).or_default();
            usage.count += 1;
            usage.bytes += object.size;
        }

        let used_percent = if quota_bytes == 0 {
            0.0
        } else {
            let raw = total_bytes as f64 / quota_bytes as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };

        Self {
            total_bytes,
            total_files,
            quota_bytes,
            remaining_bytes: quota_bytes.saturating_sub(total_bytes),
            used_percent,
            by_extension,
        }
    }
}

/// MockStorageService
///
/// In-memory bucket for tests. `should_fail` makes every operation error.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Mock pre-populated with `objects`.
    pub fn with_objects(objects: Vec<StoredObject>) -> Self {
        let map = objects.into_iter().map(|o| (o.key.clone(), o)).collect();
        Self {
            should_fail: false,
            objects: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError("Mock Storage Error: Simulation requested".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.check()?;
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }

    async fn upload_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        self.check()?;
        let key = sanitize_key(key);
        let object = StoredObject {
            key: key.clone(),
            size: bytes.len() as u64,
        };
        self.objects.write().await.insert(key, object);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.objects.write().await.remove(&sanitize_key(key));
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, StorageError> {
        self.check()?;
        Ok(self.objects.read().await.values().cloned().collect())
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://localhost:9000/mock-bucket/{}", sanitize_key(key))
    }
}

/// StorageState
///
/// Shared handle to the storage service held by `AppState`.
pub type StorageState = Arc<dyn StorageService>;
