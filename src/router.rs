//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Controllers are mounted
//! under a prefix at startup; the router then owns every route as
//! `Arc<Route>` and is shared read-only by all connections.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use tracing::info;

use crate::chain;
use crate::context::RequestContext;
use crate::controller::Controller;
use crate::error_mapper;
use crate::http_error::{ApiError, HttpError};
use crate::method::Method;
use crate::response::Response;
use crate::route::Route;
use crate::status::Status;

/// The application routing table.
///
/// ```rust,ignore
/// let app = Router::new()
///     .mount("/offers", offer::controller(&deps))
///     .mount("/users", user::controller(&deps))
///     .mount("", health::controller());
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<Route>>>,
    count: usize,
}

pub(crate) enum Lookup {
    Found(Arc<Route>, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), count: 0 }
    }

    /// Adds every route of `controller`, re-rooted under `prefix`.
    ///
    /// # Panics
    ///
    /// Panics when a path is malformed or collides with an already mounted
    /// route of the same method, including routes of other controllers.
    pub fn mount(mut self, prefix: &str, controller: Controller) -> Self {
        let name = controller.name();
        for route in controller.into_routes() {
            let route = route.prefixed(prefix);
            let method = route.method();
            let path = route.path().to_owned();
            self.routes
                .entry(method)
                .or_default()
                .insert(path.clone(), Arc::new(route))
                .unwrap_or_else(|e| panic!("{name}: invalid route `{method} {path}`: {e}"));
            self.count += 1;
        }
        self
    }

    /// Number of mounted routes.
    pub fn len(&self) -> usize { self.count }
    pub fn is_empty(&self) -> bool { self.count == 0 }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }

        let other_method = self.routes.iter()
            .any(|(m, tree)| *m != method && tree.at(path).is_ok());
        if other_method { Lookup::MethodNotAllowed } else { Lookup::NotFound }
    }

    /// Routes one request with a fully read body and produces its response.
    ///
    /// This is the transport-independent entry point: the server calls it
    /// after collecting the body, tests call it directly.
    pub async fn dispatch(&self, req: http::Request<Bytes>) -> Response {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let verb = parts.method.clone();
        let path = parts.uri.path().to_owned();

        let response = match Method::try_from(&verb) {
            Err(()) => unrouted(Status::MethodNotAllowed, &verb, &path),
            Ok(method) => match self.lookup(method, &path) {
                Lookup::Found(route, params) => {
                    let ctx = RequestContext::from_parts(method, parts, params, body);
                    chain::run(&route, ctx).await
                }
                Lookup::MethodNotAllowed => unrouted(Status::MethodNotAllowed, &verb, &path),
                Lookup::NotFound => unrouted(Status::NotFound, &verb, &path),
            },
        };

        info!(
            method = %verb,
            path = %path,
            status = response.status_code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request"
        );
        response
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn unrouted(status: Status, method: &http::Method, path: &str) -> Response {
    let err = ApiError::from(HttpError::from_component(
        status,
        format!("Cannot {method} {path}"),
        "Router",
    ));
    error_mapper::map(&err, path)
}
