//! Typed request failures.
//!
//! Middlewares, handlers and collaborators fail with [`ApiError`]. Nothing on
//! the request path formats an error response itself; the
//! [`error_mapper`](crate::error_mapper) is the only place that turns an
//! `ApiError` into a status code and JSON body.

use serde::Serialize;
use thiserror::Error;

use crate::status::Status;

/// One rejected field of a request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// A failure that carries its own status code.
///
/// Raised by handlers for outcomes the generic kinds do not cover, e.g. an
/// ownership mismatch reported as `404`. `source_component` names the
/// controller or middleware that raised it and only reaches the logs.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpError {
    pub status: Status,
    pub message: String,
    pub source_component: Option<&'static str>,
}

impl HttpError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), source_component: None }
    }

    pub fn from_component(
        status: Status,
        message: impl Into<String>,
        component: &'static str,
    ) -> Self {
        Self { status, message: message.into(), source_component: Some(component) }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error")]
    Validation(Vec<FieldViolation>),

    #[error("`{value}` is not a valid {param}")]
    BadIdentifier { param: String, value: String },

    #[error("{resource} with id `{id}` not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    UploadFailure(String),

    #[error(transparent)]
    Http(#[from] HttpError),

    /// Anything unexpected: collaborator outages, I/O, bugs. Mapped to a
    /// fixed `500` message; the cause is logged, never sent.
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn upload_failure(message: impl Into<String>) -> Self {
        Self::UploadFailure(message.into())
    }

    pub fn bad_identifier(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self::BadIdentifier { param: param.into(), value: value.into() }
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { resource, id: id.into() }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_)
            | Self::BadIdentifier { .. }
            | Self::UploadFailure(_) => Status::BadRequest,
            Self::NotFound { .. } => Status::NotFound,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Conflict(_) => Status::Conflict,
            Self::Http(e) => e.status,
            Self::Unknown(_) => Status::InternalServerError,
        }
    }

    /// Machine-readable kind, sent as `errorType`.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadIdentifier { .. } => "BAD_IDENTIFIER",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Conflict(_) => "CONFLICT",
            Self::UploadFailure(_) => "UPLOAD_FAILURE",
            Self::Http(e) => match e.status {
                Status::NotFound => "NOT_FOUND",
                Status::Unauthorized => "UNAUTHORIZED",
                Status::Conflict => "CONFLICT",
                s if s.is_server_error() => "INTERNAL_ERROR",
                _ => "COMMON_ERROR",
            },
            Self::Unknown(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_fixed_statuses() {
        assert_eq!(ApiError::Validation(vec![]).status(), Status::BadRequest);
        assert_eq!(ApiError::bad_identifier("offerId", "abc").status(), Status::BadRequest);
        assert_eq!(ApiError::not_found("Offer", "x").status(), Status::NotFound);
        assert_eq!(ApiError::unauthorized("no").status(), Status::Unauthorized);
        assert_eq!(ApiError::conflict("dup").status(), Status::Conflict);
        assert_eq!(ApiError::upload_failure("none").status(), Status::BadRequest);
        assert_eq!(
            ApiError::from(anyhow::anyhow!("db down")).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn http_error_keeps_its_status() {
        let err: ApiError =
            HttpError::from_component(Status::NotFound, "Offer not found", "OfferController").into();
        assert_eq!(err.status(), Status::NotFound);
        assert_eq!(err.error_type(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Offer not found");
    }

    #[test]
    fn not_found_message_names_resource_and_id() {
        let err = ApiError::not_found("Offer", "6650f1c2a1b2c3d4e5f60718");
        assert_eq!(err.to_string(), "Offer with id `6650f1c2a1b2c3d4e5f60718` not found");
    }
}
