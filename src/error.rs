//! Infrastructure error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Failures that stop the service from starting or serving.
///
/// Request-level failures are [`ApiError`](crate::ApiError)s and become HTTP
/// responses; this type surfaces binding to a port, accepting connections and
/// reading configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
