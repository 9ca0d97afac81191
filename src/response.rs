//! The value every request resolves to, plus [`IntoResponse`].
//!
//! A handler, a terminating middleware or the error mapper produces exactly
//! one [`Response`]; the server turns it into a hyper response at the edge.

use bytes::Bytes;
use http::HeaderMap;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http_body_util::Full;
use serde::Serialize;
use tracing::{error, warn};

use crate::status::Status;

const JSON: &str = "application/json";
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// An outgoing HTTP response.
///
/// ```rust
/// use six_cities::{Response, Status};
///
/// let res = Response::builder()
///     .status(Status::Created)
///     .header("location", "/offers/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// assert_eq!(res.status_code(), 201);
/// assert_eq!(res.header("Location"), Some("/offers/42"));
/// ```
#[derive(Debug)]
pub struct Response {
    status: Status,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200`, JSON content type.
    pub fn json(body: Vec<u8>) -> Self {
        Self::builder().json(body)
    }

    /// `200`, plain text.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Only a status line, no body.
    pub fn status(code: Status) -> Self {
        Self::builder().status(code).no_body()
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: Status::Ok, headers: HeaderMap::new() }
    }

    /// Serializes `value` as the JSON body of a `code` response.
    ///
    /// Never fails: a value that cannot be serialized is logged and answered
    /// with a bare `500`.
    pub fn serialized<T: Serialize + ?Sized>(code: Status, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::builder().status(code).json(bytes),
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                Self::status(Status::InternalServerError)
            }
        }
    }

    pub fn status_code(&self) -> u16 { self.status.code() }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = http::StatusCode::from_u16(self.status.code())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        *res.headers_mut() = self.headers;
        res
    }
}

/// Builder for a [`Response`] with a custom status or extra headers.
/// Starts at `200`; finished by one of the body methods.
pub struct ResponseBuilder {
    status: Status,
    headers: HeaderMap,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    /// Appends a header. A name or value that is not valid HTTP is dropped
    /// with a warning.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!(header = %name, "dropping invalid response header"),
        }
        self
    }

    pub fn json(self, body: Vec<u8>) -> Response {
        self.with_body(JSON, Bytes::from(body))
    }

    pub fn text(self, body: impl Into<String>) -> Response {
        let body: String = body.into();
        self.with_body(PLAIN_TEXT, Bytes::from(body))
    }

    pub fn no_body(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Bytes::new() }
    }

    fn with_body(mut self, content_type: &'static str, body: Bytes) -> Response {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Response { status: self.status, headers: self.headers, body }
    }
}

/// Anything a handler may return on success.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

/// `200 OK` with `T` serialized as JSON.
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        Response::serialized(Status::Ok, &self.0)
    }
}
