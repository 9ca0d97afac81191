//! The single translation boundary from [`ApiError`] to an HTTP response.
//!
//! Every failure raised while a request is in flight, whether from a
//! middleware, a handler or a collaborator, ends up here. Known kinds keep
//! their status and message; [`ApiError::Unknown`] is answered with a fixed
//! `500` body so internal details never reach the client.

use serde::Serialize;
use tracing::{error, warn};

use crate::http_error::{ApiError, FieldViolation};
use crate::response::Response;

/// Message sent for every unmapped failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// JSON error body: `{ errorType, message, details? }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody<'a> {
    pub error_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a [FieldViolation]>,
}

/// Builds the response for `err`. `origin` is a log label, usually the route.
pub fn map(err: &ApiError, origin: &str) -> Response {
    let status = err.status();

    let (message, details) = match err {
        ApiError::Unknown(cause) => {
            error!(origin, error = ?cause, "unhandled failure");
            (INTERNAL_ERROR_MESSAGE.to_owned(), None)
        }
        ApiError::Http(http) if status.is_server_error() => {
            error!(
                origin,
                component = http.source_component.unwrap_or("-"),
                error = %http,
                "request failed"
            );
            (INTERNAL_ERROR_MESSAGE.to_owned(), None)
        }
        ApiError::Http(http) => {
            warn!(
                origin,
                status = status.code(),
                component = http.source_component.unwrap_or("-"),
                "{http}"
            );
            (http.message.clone(), None)
        }
        ApiError::Validation(violations) => {
            warn!(origin, violations = violations.len(), "request body rejected");
            (err.to_string(), Some(violations.as_slice()))
        }
        other => {
            warn!(origin, status = status.code(), error_type = other.error_type(), "{other}");
            (other.to_string(), None)
        }
    };

    let body = ErrorBody { error_type: err.error_type(), message, details };
    Response::serialized(status, &body)
}
