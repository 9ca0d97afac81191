//! hyper accept loop with graceful shutdown.
//!
//! Once the shutdown future resolves the listener is dropped, so no new
//! connection is accepted, and `serve` returns after the last in-flight
//! connection finished.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::error_mapper;
use crate::http_error::{ApiError, HttpError};
use crate::router::Router;
use crate::status::Status;

pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// The address is bound lazily, by [`serve`](Server::serve).
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_until(router, shutdown_signal()).await
    }

    /// Serves `router` until `shutdown` resolves, then drains.
    pub async fn serve_until<F>(self, router: Router, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        serve_listener(listener, router, shutdown).await
    }
}

pub(crate) async fn serve_listener<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    let router = Arc::new(router);
    let mut connections = JoinSet::new();

    info!(%addr, routes = router.len(), "six-cities listening");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!(in_flight = connections.len(), "shutting down, draining connections");
                break;
            }

            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    connections.spawn(serve_connection(Arc::clone(&router), TokioIo::new(stream), peer));
                }
                Err(e) => error!("accept error: {e}"),
            },

            // Finished connections are reaped as we go.
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    while connections.join_next().await.is_some() {}

    info!("six-cities stopped");
    Ok(())
}

async fn serve_connection(router: Arc<Router>, io: TokioIo<tokio::net::TcpStream>, peer: SocketAddr) {
    let service = service_fn(move |req| handle(Arc::clone(&router), req));

    // HTTP/1.1 or HTTP/2, whichever the client speaks.
    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
        .serve_connection(io, service)
        .await
    {
        error!(%peer, "connection error: {e}");
    }
}

/// Reads the whole body, then routes. Every failure is already a response
/// here, hence `Infallible`.
async fn handle(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let response = match body.collect().await {
        Ok(collected) => {
            router.dispatch(http::Request::from_parts(parts, collected.to_bytes())).await
        }
        Err(e) => {
            warn!(path = %parts.uri.path(), "failed to read request body: {e}");
            let err = ApiError::from(HttpError::from_component(
                Status::BadRequest,
                "Unreadable request body",
                "Server",
            ));
            error_mapper::map(&err, parts.uri.path())
        }
    };

    Ok(response.into_inner())
}

/// SIGTERM or Ctrl-C, whichever comes first. A handler that fails to install
/// never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
