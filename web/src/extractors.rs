//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation id
//! - `ApiJson` / `ApiQuery` / `ApiPath`: `Json`, `Query` and `Path` whose
//!   rejections render as [`AppError`] bodies instead of axum's plain-text
//!   defaults
//!
//! # Examples
//!
//! ```ignore
//! use banquet_web::extractors::{ApiJson, CorrelationId};
//!
//! async fn handler(
//!     correlation_id: CorrelationId,
//!     ApiJson(request): ApiJson<BookingRequest>,
//! ) -> Result<Json<Booking>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Processing request");
//!     ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use tower_http::request_id::RequestId;
use uuid::Uuid;

/// Correlation id of the current request.
///
/// Reads the id assigned by the correlation layer, falls back to the raw
/// `x-correlation-id` header, and generates a UUID v4 when neither is there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
            })
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

        Ok(Self(correlation_id))
    }
}

/// JSON body extractor that rejects with a 400 [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor that rejects with a 400 [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path parameter extractor that rejects with a 400 [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request},
    };

    async fn extract(req: Request<Body>) -> CorrelationId {
        let (mut parts, _body) = req.into_parts();
        CorrelationId::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let req = Request::builder()
            .header("X-Correlation-ID", "desk-7")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract(req).await.0, "desk-7");
    }

    #[tokio::test]
    async fn test_correlation_id_prefers_assigned_id() {
        let mut req = Request::builder()
            .header(CORRELATION_ID_HEADER, "from-client")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("assigned")));

        assert_eq!(extract(req).await.0, "assigned");
    }

    #[tokio::test]
    async fn test_correlation_id_generated_when_absent() {
        let req = Request::builder().body(Body::empty()).unwrap();

        assert!(Uuid::parse_str(&extract(req).await.0).is_ok());
    }
}
