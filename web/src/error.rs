//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses. Every error body is
//! JSON with an `error` message and a machine-readable `code`; server errors
//! add `details`, missing-field errors add `missingFields`, and handlers may
//! attach further keys such as `existingPhone`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use banquet_core::error::{BanquetError, ErrorKind};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```
/// use banquet_web::AppError;
/// use banquet_core::BanquetError;
/// use axum::http::StatusCode;
///
/// let err = AppError::from(BanquetError::SlotAlreadyBooked);
/// assert_eq!(err.status(), StatusCode::CONFLICT);
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Underlying failure text, exposed on server errors
    details: Option<String>,
    /// Names of absent request fields
    missing_fields: Vec<&'static str>,
    /// Extra top-level body keys
    extra: Map<String, Value>,
    /// Internal error (for logging)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            details: None,
            missing_fields: Vec::new(),
            extra: Map::new(),
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.details = Some(source.to_string());
        self.source = Some(source);
        self
    }

    /// Attach the underlying failure text.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Add a top-level key to the response body.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message, "FORBIDDEN")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message, "CONFLICT")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "SERVICE_UNAVAILABLE")
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    /// Human-readable error message.
    error: String,
    /// Error code (for client error handling).
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_fields: Vec<&'static str>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                details = self.details.as_deref().unwrap_or_default(),
                "Internal server error"
            );
        } else {
            tracing::debug!(status = %self.status, code = %self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.message,
            code: self.code,
            details: self.details,
            missing_fields: self.missing_fields,
            extra: self.extra,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<BanquetError> for AppError {
    fn from(err: BanquetError) -> Self {
        let message = err.to_string();
        match err {
            BanquetError::MissingFields(fields) => Self {
                missing_fields: fields,
                ..Self::new(
                    StatusCode::BAD_REQUEST,
                    "Missing required fields",
                    "MISSING_FIELDS",
                )
            },
            BanquetError::InvalidIdFormat { .. } => {
                Self::new(StatusCode::BAD_REQUEST, message, "INVALID_ID_FORMAT")
            }
            BanquetError::CapacityExceeded { .. } => {
                Self::new(StatusCode::BAD_REQUEST, message, "CAPACITY_EXCEEDED")
            }
            // Customer and catalog duplicates keep the 400 the clients expect.
            BanquetError::DuplicateName
            | BanquetError::DuplicatePhone
            | BanquetError::DuplicateEntry(_) => {
                Self::new(StatusCode::BAD_REQUEST, message, "DUPLICATE")
            }
            BanquetError::AccountExpired => {
                Self::new(StatusCode::FORBIDDEN, message, "ACCOUNT_EXPIRED")
            }
            BanquetError::Database(details) | BanquetError::Internal(details) => {
                Self::internal("Internal server error").with_details(details)
            }
            other => match other.kind() {
                ErrorKind::Validation | ErrorKind::Capacity => Self::bad_request(message),
                ErrorKind::Authentication => Self::unauthorized(message),
                ErrorKind::Authorization => Self::forbidden(message),
                ErrorKind::NotFound => Self::not_found(message),
                ErrorKind::Conflict => Self::conflict(message),
                ErrorKind::Internal => Self::internal(message),
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (BanquetError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (BanquetError::AccountExpired, StatusCode::FORBIDDEN),
            (BanquetError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (BanquetError::CompanyNotFound, StatusCode::NOT_FOUND),
            (BanquetError::NotFound("Event"), StatusCode::NOT_FOUND),
            (BanquetError::DuplicatePhone, StatusCode::BAD_REQUEST),
            (BanquetError::UserIdTaken, StatusCode::CONFLICT),
            (BanquetError::SlotAlreadyBooked, StatusCode::CONFLICT),
            (BanquetError::InvalidPlan("gold".into()), StatusCode::BAD_REQUEST),
            (
                BanquetError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn missing_fields_are_listed() {
        let (status, body) = body_of(BanquetError::MissingFields(vec!["user_id", "plan"]).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["missingFields"], serde_json::json!(["user_id", "plan"]));
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn server_errors_carry_details() {
        let (status, body) = body_of(BanquetError::Database("connection reset".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "connection reset");
    }

    #[tokio::test]
    async fn extra_fields_are_flattened() {
        let (status, body) = body_of(
            AppError::conflict("Event name already exists").with_field("existingPhone", "5551234"),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["existingPhone"], "5551234");
        assert_eq!(body["code"], "CONFLICT");
    }
}
