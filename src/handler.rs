//! Route handlers and how they are stored.
//!
//! Each handler is its own closure or `fn` type, yet one controller keeps all
//! of its routes in a single `Vec<Route>`. [`Route::new`](crate::Route::new)
//! therefore erases the concrete type right away into a [`BoxedHandler`].
//! Calling it at request time costs one virtual call plus one boxed future.
//!
//! Handlers that depend on services take an extra first argument and are
//! bound with [`with_state`]:
//!
//! ```rust,ignore
//! async fn show(state: AppState, ctx: RequestContext) -> Result<Json<OfferRdo>, ApiError>;
//!
//! Route::new(Method::Get, "/{offerId}", with_state(state.clone(), show))
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::http_error::ApiError;
use crate::response::{IntoResponse, Response};

/// Outcome of a handler after erasure. `Err` goes to the error mapper.
pub type HandlerResult = Result<Response, ApiError>;

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

// Public only because `Handler::into_boxed_handler` names it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: RequestContext) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Anything of the shape
/// `Fn(RequestContext) -> impl Future<Output = Result<impl IntoResponse, ApiError>>`.
///
/// Sealed; the blanket impl is the only one.
pub trait Handler: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod sealed {
    pub trait Sealed {}
}

impl<F, Fut, R> sealed::Sealed for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Erased(self))
    }
}

/// Closes `f` over `state`, yielding a one-argument [`Handler`].
///
/// `state` is cloned for every request; keep it a bundle of `Arc`s.
pub fn with_state<S, F, Fut, R>(state: S, f: F) -> impl Fn(RequestContext) -> Fut + Send + Sync + 'static
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |ctx| f(state.clone(), ctx)
}

struct Erased<F>(F);

impl<F, Fut, R> ErasedHandler for Erased<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture {
        let pending = (self.0)(ctx);
        Box::pin(async move { pending.await.map(IntoResponse::into_response) })
    }
}
