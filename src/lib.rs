//! # six-cities
//!
//! A REST service for rental offers in six cities: listings, users,
//! comments and favorites, served over HTTP/1.1 and HTTP/2 behind a reverse
//! proxy.
//!
//! ## The request pipeline
//!
//! Every endpoint is a [`Route`]: method, path, an ordered list of
//! [`Middleware`] and a handler. Controllers group the routes of one resource
//! family and are mounted on the [`Router`] at startup.
//!
//! ```text
//! request ─► Router (matchit) ─► chain::run
//!                                  ├─ middleware 1 ── Err ─┐
//!                                  ├─ middleware n ── Err ─┤
//!                                  └─ handler ─────── Err ─┴─► error_mapper::map
//!                                        │
//!                                        └─► ok / created / no_content
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use six_cities::{Controller, Method, RequestContext, Route, Router, Server};
//! use six_cities::{ApiError, controller::ok};
//! use six_cities::middleware::ValidateIdentifier;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), six_cities::Error> {
//!     let mut offers = Controller::new("OfferController");
//!     offers.add_route(
//!         Route::new(Method::Get, "/{offerId}", get_offer)
//!             .with(ValidateIdentifier::new("offerId")),
//!     );
//!
//!     let app = Router::new().mount("/offers", offers);
//!     Server::bind("0.0.0.0:4000".parse().unwrap()).serve(app).await
//! }
//!
//! async fn get_offer(ctx: RequestContext) -> Result<six_cities::Response, ApiError> {
//!     let id = ctx.param("offerId").unwrap_or_default();
//!     Ok(ok(&serde_json::json!({ "id": id })))
//! }
//! ```

mod error;
mod handler;
mod method;
mod response;
mod route;
mod router;
mod server;
mod status;

pub mod app;
pub mod auth;
pub mod chain;
pub mod config;
pub mod context;
pub mod controller;
pub mod error_mapper;
pub mod health;
pub mod http_error;
pub mod middleware;
pub mod modules;
pub mod object_id;
pub mod shape;
pub mod upload;

pub use context::RequestContext;
pub use controller::Controller;
pub use error::Error;
pub use handler::{Handler, HandlerResult, with_state};
pub use http_error::{ApiError, FieldViolation, HttpError};
pub use method::Method;
pub use middleware::{Middleware, Outcome};
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use route::Route;
pub use router::Router;
pub use server::Server;
pub use status::Status;
