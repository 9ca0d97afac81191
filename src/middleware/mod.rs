//! Middleware layer.
//!
//! A middleware enforces exactly one cross-cutting concern before the handler
//! runs. The set is closed: every kind is a variant of [`Middleware`], and the
//! chain executor dispatches through [`Middleware::execute`].
//!
//! | Kind | Writes to the context |
//! |---|---|
//! | [`ValidateBody`] | validated, trimmed body |
//! | [`ValidateIdentifier`] | nothing |
//! | [`ResourceExists`] | resolved [`Document`] |
//! | [`RequireAuthentication`] | [`Principal`](crate::auth::Principal) |
//! | [`UploadFile`] | [`StoredFile`](crate::upload::StoredFile) |
//!
//! Failures are returned as [`ApiError`] and never formatted here; the error
//! mapper owns the response.

mod require_authentication;
mod resource_exists;
mod upload_file;
mod validate_body;
mod validate_identifier;

pub use require_authentication::RequireAuthentication;
pub use resource_exists::{Document, DocumentLookup, ResourceExists};
pub use upload_file::UploadFile;
pub use validate_body::ValidateBody;
pub use validate_identifier::ValidateIdentifier;

use crate::context::RequestContext;
use crate::http_error::ApiError;
use crate::response::Response;

/// What a middleware decided about the request.
#[derive(Debug)]
pub enum Outcome {
    /// Run the next step.
    Continue,
    /// Stop here and send this response; the handler is not called.
    Terminated(Response),
}

pub enum Middleware {
    ValidateBody(ValidateBody),
    ValidateIdentifier(ValidateIdentifier),
    ResourceExists(ResourceExists),
    RequireAuthentication(RequireAuthentication),
    UploadFile(UploadFile),
    /// Answers with a fixed status without touching the context.
    #[cfg(test)]
    Respond(crate::status::Status),
}

impl Middleware {
    pub async fn execute(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        match self {
            Self::ValidateBody(m) => m.execute(ctx),
            Self::ValidateIdentifier(m) => m.execute(ctx),
            Self::ResourceExists(m) => m.execute(ctx).await,
            Self::RequireAuthentication(m) => m.execute(ctx).await,
            Self::UploadFile(m) => m.execute(ctx).await,
            #[cfg(test)]
            Self::Respond(status) => Ok(Outcome::Terminated(Response::status(*status))),
        }
    }

    /// Short kind label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ValidateBody(_) => "validate_body",
            Self::ValidateIdentifier(_) => "validate_identifier",
            Self::ResourceExists(_) => "resource_exists",
            Self::RequireAuthentication(_) => "require_authentication",
            Self::UploadFile(_) => "upload_file",
            #[cfg(test)]
            Self::Respond(_) => "respond",
        }
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ValidateBody> for Middleware {
    fn from(m: ValidateBody) -> Self { Self::ValidateBody(m) }
}

impl From<ValidateIdentifier> for Middleware {
    fn from(m: ValidateIdentifier) -> Self { Self::ValidateIdentifier(m) }
}

impl From<ResourceExists> for Middleware {
    fn from(m: ResourceExists) -> Self { Self::ResourceExists(m) }
}

impl From<RequireAuthentication> for Middleware {
    fn from(m: RequireAuthentication) -> Self { Self::RequireAuthentication(m) }
}

impl From<UploadFile> for Middleware {
    fn from(m: UploadFile) -> Self { Self::UploadFile(m) }
}
