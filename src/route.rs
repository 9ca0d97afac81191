//! Route descriptors.

use std::fmt;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::Middleware;

/// One endpoint: method, path, handler and its ordered middleware chain.
///
/// Built once at startup and never mutated after its controller registers it.
///
/// ```rust,ignore
/// Route::new(Method::Patch, "/{offerId}", with_state(state, update_offer))
///     .with(RequireAuthentication::new(auth.clone()))
///     .with(ValidateBody::new(update_offer_shape()))
///     .with(ValidateIdentifier::new("offerId"))
///     .with(ResourceExists::new(lookup.clone(), "Offer", "offerId"));
/// ```
pub struct Route {
    method: Method,
    path: String,
    handler: BoxedHandler,
    middlewares: Vec<Middleware>,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>, handler: impl Handler) -> Self {
        Self {
            method,
            path: path.into(),
            handler: handler.into_boxed_handler(),
            middlewares: Vec::new(),
        }
    }

    /// Appends a middleware. Chains run in the order of `with` calls.
    pub fn with(mut self, middleware: impl Into<Middleware>) -> Self {
        self.middlewares.push(middleware.into());
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn middlewares(&self) -> &[Middleware] { &self.middlewares }

    pub(crate) fn handler(&self) -> &BoxedHandler { &self.handler }

    /// Re-roots the route under a controller prefix.
    pub(crate) fn prefixed(mut self, prefix: &str) -> Self {
        self.path = join_path(prefix, &self.path);
        self
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("middlewares", &self.middlewares)
            .finish_non_exhaustive()
    }
}

/// `("/offers", "/")` → `/offers`, `("/offers", "/{offerId}")` → `/offers/{offerId}`.
fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    match path {
        "" | "/" if prefix.is_empty() => "/".to_owned(),
        "" | "/" => prefix.to_owned(),
        p if p.starts_with('/') => format!("{prefix}{p}"),
        p => format!("{prefix}/{p}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_prefix_and_path() {
        assert_eq!(join_path("/offers", "/"), "/offers");
        assert_eq!(join_path("/offers/", "/{offerId}"), "/offers/{offerId}");
        assert_eq!(join_path("", "/healthz"), "/healthz");
        assert_eq!(join_path("", "/"), "/");
        assert_eq!(join_path("/users", "login"), "/users/login");
    }
}
