use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// ApiResponse
///
/// Success envelope: `{ "success": true, ...payload }`. Payload entries are
/// added by name with [`ApiResponse::with`].
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiResponse {
    fn new(status: StatusCode) -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        Self { status, body }
    }

    /// 200 OK envelope.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// 201 Created envelope.
    pub fn created() -> Self {
        Self::new(StatusCode::CREATED)
    }

    /// Adds `key: value` to the payload.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, ApiError> {
        self.body.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}
