use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::ApiQuery,
    models::{PresignedUrlRequest, PresignedUrlResponse, StorageStats, UploadedObject},
    response::ApiResponse,
    storage::{STORAGE_QUOTA_BYTES, extension_of, sanitize_key},
};

/// Largest body accepted by the direct upload route (25 MiB).
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const DEFAULT_FOLDER: &str = "uploads";

/// Builds `{folder}/{uuid}.{ext}` from a caller-supplied folder and file name.
fn object_key(folder: Option<&str>, filename: &str) -> String {
    let folder = folder
        .map(sanitize_key)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FOLDER.to_string());
    let extension = match extension_of(filename).as_str() {
        "other" => "bin".to_string(),
        ext => ext.to_string(),
    };
    format!("{}/{}.{}", folder, Uuid::new_v4(), extension)
}

/// UploadForm
///
/// Multipart body of `POST /admin/storage/upload`, documentation only.
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Target folder, `uploads` when omitted.
    pub folder: Option<String>,
}

/// get_storage_stats
///
/// [Admin Route] Bucket usage against the fixed quota, grouped by extension.
/// Recomputed from a full listing on every call.
#[utoipa::path(
    get,
    path = "/admin/storage/stats",
    responses(
        (status = 200, description = "Usage report", body = StorageStats),
        (status = 500, description = "Storage listing failed")
    )
)]
pub async fn get_storage_stats(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    let objects = state.storage.list_objects().await?;
    let stats = StorageStats::from_objects(&objects, STORAGE_QUOTA_BYTES);
    ApiResponse::ok().with("stats", stats)
}

/// list_objects
///
/// [Admin Route] Every object in the bucket with its public URL.
#[utoipa::path(
    get,
    path = "/admin/storage/objects",
    responses((status = 200, description = "Objects", body = [UploadedObject]))
)]
pub async fn list_objects(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    let objects: Vec<UploadedObject> = state
        .storage
        .list_objects()
        .await?
        .into_iter()
        .filter(|o| !o.key.ends_with('/'))
        .map(|o| UploadedObject {
            url: state.storage.public_url(&o.key),
            path: o.key,
            size: o.size,
        })
        .collect();
    ApiResponse::ok().with("objects", objects)
}

/// upload_object
///
/// [Admin Route] Multipart upload through the server. Fields: `file` (required)
/// and `folder` (optional, defaults to `uploads`). Returns the key to store on
/// the content row and its public URL.
#[utoipa::path(
    post,
    path = "/admin/storage/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Uploaded", body = UploadedObject),
        (status = 400, description = "Missing file")
    )
)]
pub async fn upload_object(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse> {
    let mut folder: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("folder") => folder = Some(field.text().await?),
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (filename, content_type, bytes) =
        file.ok_or_else(|| ApiError::validation("file field is required"))?;
    if bytes.is_empty() {
        return Err(ApiError::validation("file is empty"));
    }

    let key = object_key(folder.as_deref(), &filename);
    let size = bytes.len() as u64;
    state
        .storage
        .upload_object(&key, bytes, &content_type)
        .await?;
    tracing::info!(key = %key, size, by = %user.id, "object uploaded");

    let uploaded = UploadedObject {
        url: state.storage.public_url(&key),
        path: key,
        size,
    };
    ApiResponse::created().with("object", uploaded)
}

/// get_presigned_url
///
/// [Admin Route] Short-lived URL for a direct client-to-bucket PUT,
/// constrained to `fileType`. Keys are `{folder}/{uuid}.{ext}`.
#[utoipa::path(
    post,
    path = "/admin/storage/presigned",
    request_body = PresignedUrlRequest,
    responses((status = 200, description = "URL", body = PresignedUrlResponse))
)]
pub async fn get_presigned_url(
    _user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<PresignedUrlRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(req) = payload?;
    if req.file_type.trim().is_empty() {
        return Err(ApiError::validation("fileType is required"));
    }

    let key = object_key(req.folder.as_deref(), &req.filename);
    let upload_url = state
        .storage
        .get_presigned_upload_url(&key, &req.file_type)
        .await?;

    let response = PresignedUrlResponse {
        upload_url,
        resource_key: key,
    };
    ApiResponse::ok().with("upload", response)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObjectPath {
    /// Object key as returned by the upload routes.
    pub path: String,
}

/// delete_object
///
/// [Admin Route] Removes one object from the bucket. Admin role only.
#[utoipa::path(
    delete,
    path = "/admin/storage/objects",
    params(ObjectPath),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Empty path"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn delete_object(
    user: AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ObjectPath>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    let key = sanitize_key(&query.path);
    if key.is_empty() {
        return Err(ApiError::validation("path is required"));
    }

    state.storage.delete_object(&key).await?;
    tracing::info!(key = %key, by = %user.id, "object deleted");
    ApiResponse::ok().with("path", key)
}
