//! Request correlation and the per-request tracing span.
//!
//! Every request carries an `x-correlation-id`: the one the client sent, or
//! a fresh UUID v4. The id is echoed in the response header and recorded on
//! the request span, together with the route and, once a handler knows it,
//! the company the request concerns. A client report can then be matched to
//! the server log lines of the booking or event it is about.
//!
//! # Example
//!
//! ```
//! use axum::{Router, routing::get};
//! use banquet_web::middleware::{correlation_id_layer, request_span};
//! use tower_http::trace::TraceLayer;
//!
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .layer(TraceLayer::new_for_http().make_span_with(request_span))
//!     .layer(correlation_id_layer());
//! ```

use axum::extract::{MatchedPath, Request};
use axum::http::{HeaderName, HeaderValue};
use banquet_core::ids::CompanyId;
use tower::ServiceBuilder;
use tower::layer::util::{Identity, Stack};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tracing::Span;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Layers that assign the correlation id and copy it onto the response.
pub type CorrelationIdLayer = ServiceBuilder<
    Stack<PropagateRequestIdLayer, Stack<SetRequestIdLayer<MakeCorrelationId>, Identity>>,
>;

/// Generates a UUID v4 for requests that arrive without a correlation id.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeCorrelationId;

impl MakeRequestId for MakeCorrelationId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Correlation id layers. Install outside the [`request_span`] trace layer so
/// the span sees the id.
#[must_use]
pub fn correlation_id_layer() -> CorrelationIdLayer {
    let header = HeaderName::from_static(CORRELATION_ID_HEADER);
    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(header.clone(), MakeCorrelationId))
        .layer(PropagateRequestIdLayer::new(header))
}

/// Span for one HTTP request, for `TraceLayer::make_span_with`.
///
/// `company_id` starts empty; handlers fill it in with [`record_company`].
pub fn request_span(req: &Request) -> Span {
    let correlation_id = req
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path(), MatchedPath::as_str);

    tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %req.method(),
        route = %route,
        company_id = tracing::field::Empty,
    )
}

/// Record the company a request concerns on the current request span.
pub fn record_company(company_id: CompanyId) {
    Span::current().record("company_id", company_id.get());
}
