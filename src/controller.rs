//! Base controller and response helpers.
//!
//! A [`Controller`] owns the routes of one resource family. Resource modules
//! build one at startup, register their routes, and hand it to
//! [`Router::mount`](crate::Router::mount).

use serde::Serialize;
use tracing::info;

use crate::response::Response;
use crate::route::Route;
use crate::status::Status;

pub struct Controller {
    name: &'static str,
    routes: Vec<Route>,
}

impl Controller {
    pub fn new(name: &'static str) -> Self {
        Self { name, routes: Vec::new() }
    }

    /// Registers a route.
    ///
    /// # Panics
    ///
    /// Panics if this controller already has a route with the same method and
    /// path. Duplicates are wiring bugs and must stop startup.
    pub fn add_route(&mut self, route: Route) -> &mut Self {
        if self.routes.iter().any(|r| r.method() == route.method() && r.path() == route.path()) {
            panic!("{}: duplicate route `{route}`", self.name);
        }
        info!(controller = self.name, route = %route, middlewares = route.middlewares().len(), "route registered");
        self.routes.push(route);
        self
    }

    pub fn name(&self) -> &'static str { self.name }
    pub fn routes(&self) -> &[Route] { &self.routes }

    pub(crate) fn into_routes(self) -> Vec<Route> { self.routes }
}

// ── Response helpers ──────────────────────────────────────────────────────────
//
// The terminal, successful path of every handler. None of them can fail.

/// `200 OK` with `body` as JSON.
pub fn ok<T: Serialize + ?Sized>(body: &T) -> Response {
    Response::serialized(Status::Ok, body)
}

/// `201 Created` with `body` as JSON.
pub fn created<T: Serialize + ?Sized>(body: &T) -> Response {
    Response::serialized(Status::Created, body)
}

/// `204 No Content`.
pub fn no_content() -> Response {
    Response::status(Status::NoContent)
}
