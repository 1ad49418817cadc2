use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    models::{CreateEnquiryRequest, Enquiry, NewEnquiry},
    response::ApiResponse,
};

const DEFAULT_SOURCE: &str = "website";

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<CreateEnquiryRequest> for NewEnquiry {
    type Error = ApiError;

    /// Checks the required fields and folds the optional form fields into
    /// the `context` object.
    fn try_from(req: CreateEnquiryRequest) -> Result<Self, Self::Error> {
        let name = required(req.name, "name")?;
        let email = required(req.email, "email")?;
        let message = required(req.message, "message")?;

        let mut context: Map<String, Value> = req.context.unwrap_or_default();
        let extras = [
            ("listingSlug", req.listing_slug),
            ("projectSlug", req.project_slug),
            ("interest", req.interest),
            ("budget", req.budget),
            ("preferredContact", req.preferred_contact),
        ];
        for (key, value) in extras {
            if let Some(value) = non_blank(value) {
                context.insert(key.to_string(), Value::String(value));
            }
        }

        Ok(NewEnquiry {
            name,
            email,
            phone: non_blank(req.phone),
            message,
            context: Value::Object(context),
            source: non_blank(req.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        })
    }
}

/// create_enquiry
///
/// [Public Route] Contact-form intake. `name`, `email` and `message` are
/// required; nothing is stored when one is missing.
#[utoipa::path(
    post,
    path = "/enquiries",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 201, description = "Stored"),
        (status = 400, description = "Missing required field")
    )
)]
pub async fn create_enquiry(
    State(state): State<AppState>,
    payload: Result<Json<CreateEnquiryRequest>, JsonRejection>,
) -> ApiResult<ApiResponse> {
    let Json(req) = payload?;
    let enquiry = NewEnquiry::try_from(req)?;

    let stored = state.repo.create_enquiry(enquiry).await?;
    tracing::info!(enquiry_id = %stored.id, source = %stored.source, "enquiry received");
    ApiResponse::created().with("id", stored.id)
}

/// list_enquiries
///
/// [Admin Route] Every enquiry, newest first. Admin role only.
#[utoipa::path(
    get,
    path = "/admin/enquiries",
    responses(
        (status = 200, description = "Enquiries", body = [Enquiry]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_enquiries(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    let enquiries = state.repo.list_enquiries().await?;
    ApiResponse::ok().with("enquiries", enquiries)
}

#[utoipa::path(
    delete,
    path = "/admin/enquiries/{id}",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_enquiry(
    user: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse> {
    user.require_admin()?;
    if !state.repo.delete_enquiry(id).await? {
        return Err(ApiError::not_found("enquiry"));
    }
    ApiResponse::ok().with("id", id)
}
