//! HTTP-facing error type with structured JSON bodies.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::sanitize::ValidationError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// An account already uses this value of the named field.
    #[error("{0} already exists")]
    Taken(&'static str),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, field, message) = match self {
            ApiError::Validation(e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", Some(e.field), e.message)
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", None, detail),
            ApiError::Taken(field) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                Some(field.to_string()),
                format!("{field} already exists"),
            ),
            ApiError::Unauthorized(detail) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", None, detail)
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", None, detail),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    None,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, field, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(date) => {
                ApiError::Conflict(format!("A record for {date} already exists"))
            }
            StoreError::Taken(field) => ApiError::Taken(field),
            StoreError::NotFound => ApiError::NotFound("Record not found".into()),
            StoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

// Extractor rejections carry serde wording; clients get a field name instead.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        ValidationError::new("body", "expected a JSON object with the documented fields").into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected query string");
        ValidationError::new("user_id", "expected a user_id UUID query parameter").into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected path parameter");
        ValidationError::new("id", "expected a UUID").into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chrono::NaiveDate;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_names_field() {
        let err = ValidationError::new("date", "expected YYYY-MM-DD");
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
        assert_eq!(json["error"]["field"], "date");
    }

    #[tokio::test]
    async fn conflict_is_distinct_from_validation() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let response = ApiError::from(StoreError::Conflict(date)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert!(json["error"].get("field").is_none());
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("connection reset by peer".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn taken_account_field_is_a_named_conflict() {
        let response = ApiError::from(StoreError::Taken("email")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["field"], "email");
        assert_eq!(json["error"]["message"], "email already exists");
    }

    #[tokio::test]
    async fn bad_credentials_are_401() {
        let response = ApiError::Unauthorized("Invalid credentials".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn store_not_found_maps_to_404() {
        let response = ApiError::from(StoreError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
