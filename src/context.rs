//! Per-request state threaded through the middleware chain.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::Principal;
use crate::http_error::{ApiError, FieldViolation};
use crate::method::Method;
use crate::middleware::Document;
use crate::upload::StoredFile;

/// Everything known about one in-flight request.
///
/// Created by the router after a route matched, handed by `&mut` to each
/// middleware in order, then moved into the handler. Fields written by a
/// middleware (validated body, principal, resolved documents, stored file)
/// are therefore only visible to the steps after it.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    headers: HeaderMap,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    raw_body: Bytes,
    body: Option<Value>,
    principal: Option<Principal>,
    documents: HashMap<&'static str, Document>,
    file: Option<StoredFile>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            params: HashMap::new(),
            query: HashMap::new(),
            raw_body: Bytes::new(),
            body: None,
            principal: None,
            documents: HashMap::new(),
            file: None,
        }
    }

    pub(crate) fn from_parts(
        method: Method,
        parts: http::request::Parts,
        params: HashMap<String, String>,
        raw_body: Bytes,
    ) -> Self {
        let query = parts.uri.query().map(parse_query).unwrap_or_default();
        Self {
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            params,
            query,
            raw_body,
            ..Self::new(method, String::new())
        }
    }

    // ── Construction helpers (tests, internal callers) ───────────────────────

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Adds a header; invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) =
            (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
        {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.raw_body = body.into();
        self
    }

    // ── Request data ──────────────────────────────────────────────────────────

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn raw_body(&self) -> &Bytes { &self.raw_body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/offers/{offerId}`, `ctx.param("offerId")` on
    /// `/offers/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    // ── State written by middlewares ─────────────────────────────────────────

    /// The validated body, present once `ValidateBody` ran.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Deserializes the validated body, or the raw body when no validation
    /// step ran.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let parsed = match &self.body {
            Some(value) => T::deserialize(value),
            None => serde_json::from_slice(&self.raw_body),
        };
        parsed.map_err(|e| ApiError::Validation(vec![FieldViolation::new("body", e.to_string())]))
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The principal, or `Unauthorized` when the route is not behind
    /// `RequireAuthentication`.
    pub fn require_principal(&self) -> Result<&Principal, ApiError> {
        self.principal.as_ref().ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }

    pub(crate) fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// The document `ResourceExists` resolved under `resource`, downcast to `T`.
    pub fn document<T>(&self, resource: &str) -> Option<Arc<T>>
    where
        T: std::any::Any + Send + Sync,
    {
        self.documents.get(resource).and_then(Document::downcast)
    }

    pub(crate) fn insert_document(&mut self, resource: &'static str, document: Document) {
        self.documents.insert(resource, document);
    }

    pub fn file(&self) -> Option<&StoredFile> {
        self.file.as_ref()
    }

    pub(crate) fn set_file(&mut self, file: StoredFile) {
        self.file = Some(file);
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}
