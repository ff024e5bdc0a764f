//! Filter error types and their HTTP rendering

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while parsing deep-object filter parameters.
///
/// Both variants are bad-request conditions: parsing stops at the first
/// offending parameter in request order and no partial predicate is
/// returned. `param` is the root parameter name (e.g. `filter`), so the
/// message points the client at the namespace that failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A parameter claimed the filter namespace but broke the bracket grammar.
    #[error("The '{param}' parameter is incorrectly formatted")]
    MalformedParameter { param: String },

    /// A non-integer value was supplied to an ordering operator.
    #[error(
        "The '{param}' value must be an integer when given the 'gt', 'gte', 'lt' or 'lte' operators"
    )]
    NonIntegerOperand { param: String },
}

impl FilterError {
    pub fn malformed(param: impl Into<String>) -> Self {
        Self::MalformedParameter {
            param: param.into(),
        }
    }

    pub fn non_integer(param: impl Into<String>) -> Self {
        Self::NonIntegerOperand {
            param: param.into(),
        }
    }

    /// Stable machine-readable code for the error response body.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedParameter { .. } => "INVALID_FILTER_SYNTAX",
            Self::NonIntegerOperand { .. } => "INVALID_FILTER_VALUE",
        }
    }
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": self.code(),
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}
