//! Startup composition: config → services → controllers → router → server.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::Error;
use crate::health;
use crate::modules::{AppState, comment, offer, user};
use crate::router::Router;
use crate::server::Server;

/// Installs the global subscriber. `RUST_LOG` wins; otherwise `info`.
///
/// ```text
/// RUST_LOG=info,six_cities=debug six-cities
/// ```
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Mounts every controller under its prefix.
///
/// # Panics
///
/// Panics on duplicate or conflicting routes.
pub fn build_router(state: &AppState) -> Router {
    Router::new()
        .mount("/offers", offer::controller(state))
        .mount("/users", user::controller(state))
        .mount("/comments", comment::controller(state))
        .mount("", health::controller())
}

pub async fn run() -> Result<(), Error> {
    init_tracing();
    let config = Config::from_env()?;

    info!(
        addr = %config.addr,
        upload_directory = %config.upload_directory.display(),
        "starting six-cities"
    );

    let state = AppState::in_memory(&config);
    let router = build_router(&state);

    Server::bind(config.addr).serve(router).await
}
