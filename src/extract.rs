//! Ordered query extraction for axum handlers
//!
//! `axum::extract::Query` deserializes into a struct, which drops duplicate
//! keys and loses wire order. Deep-object filters need the raw pairs in
//! request order, so this extractor decodes the query string itself.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::query::QueryParams;

/// Maximum accepted raw query-string size in bytes (16KB)
const MAX_QUERY_SIZE: usize = 16 * 1024;

/// Extractor yielding the request's query parameters in wire order.
///
/// Returns a 400 Bad Request when the raw query string exceeds the 16KB
/// cap; a missing query string yields empty parameters.
#[derive(Debug, Clone)]
pub struct OrderedQuery(pub QueryParams);

impl<S> FromRequestParts<S> for OrderedQuery
where
    S: Send + Sync,
{
    type Rejection = OrderedQueryRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        if query.len() > MAX_QUERY_SIZE {
            return Err(OrderedQueryRejection::TooLarge);
        }
        Ok(Self(QueryParams::from_query_str(query)))
    }
}

/// Rejection for [`OrderedQuery`].
#[derive(Debug)]
pub enum OrderedQueryRejection {
    /// Raw query string exceeded the size cap
    TooLarge,
}

impl IntoResponse for OrderedQueryRejection {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            Self::TooLarge => (
                "QUERY_TOO_LARGE",
                format!("Query string exceeds maximum size of {} bytes", MAX_QUERY_SIZE),
            ),
        };
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
