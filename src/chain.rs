//! Chain executor: middlewares in order, then the handler.
//!
//! Per request:
//!
//! ```text
//! Pending → MiddlewareRunning ─┬→ HandlerRunning → ResponseSent
//!                              ├→ ResponseSent            (Outcome::Terminated)
//!                              └→ ErrorMapped → ResponseSent
//! ```
//!
//! [`run`] returns exactly one [`Response`]. Failures are not caught per
//! step: the first `Err` ends the chain and is mapped once, at the end.

use tracing::debug;

use crate::context::RequestContext;
use crate::error_mapper;
use crate::handler::HandlerResult;
use crate::middleware::Outcome;
use crate::response::Response;
use crate::route::Route;

/// Drives `ctx` through `route` and produces its only response.
pub async fn run(route: &Route, ctx: RequestContext) -> Response {
    match drive(route, ctx).await {
        Ok(response) => response,
        Err(err) => error_mapper::map(&err, &route.to_string()),
    }
}

async fn drive(route: &Route, mut ctx: RequestContext) -> HandlerResult {
    for (step, middleware) in route.middlewares().iter().enumerate() {
        // Strictly sequential: later steps read what earlier ones wrote.
        match middleware.execute(&mut ctx).await? {
            Outcome::Continue => {}
            Outcome::Terminated(response) => {
                debug!(route = %route, step, middleware = middleware.name(), "chain terminated early");
                return Ok(response);
            }
        }
    }

    route.handler().call(ctx).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::auth::JwtAuth;
    use crate::http_error::ApiError;
    use crate::method::Method;
    use crate::middleware::{Middleware, RequireAuthentication, ValidateBody, ValidateIdentifier};
    use crate::shape::{BodyShape, FieldKind};
    use crate::status::Status;

    fn flagged_route(flag: Arc<AtomicBool>) -> Route {
        Route::new(Method::Post, "/offers/{offerId}", move |_ctx: RequestContext| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, ApiError>(Status::NoContent)
            }
        })
    }

    #[tokio::test]
    async fn failing_middleware_skips_handler_and_later_steps() {
        let flag = Arc::new(AtomicBool::new(false));
        let auth = Arc::new(JwtAuth::new("secret", chrono::Duration::hours(1)));
        let route = flagged_route(Arc::clone(&flag))
            .with(ValidateIdentifier::new("offerId"))
            .with(RequireAuthentication::new(auth));

        let ctx = RequestContext::new(Method::Post, "/offers/abc").with_param("offerId", "abc");
        let res = run(&route, ctx).await;

        // The identifier check failed first, so the 401 step never ran.
        assert_eq!(res.status_code(), 400);
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn terminating_middleware_answers_and_skips_the_rest() {
        let flag = Arc::new(AtomicBool::new(false));
        let auth = Arc::new(JwtAuth::new("secret", chrono::Duration::hours(1)));
        let route = flagged_route(Arc::clone(&flag))
            .with(Middleware::Respond(Status::Conflict))
            .with(RequireAuthentication::new(auth));

        let ctx = RequestContext::new(Method::Post, "/offers/abc").with_param("offerId", "abc");
        let res = run(&route, ctx).await;

        // Neither the 401 step nor the handler ran.
        assert_eq!(res.status_code(), 409);
        assert!(res.body().is_empty());
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn passing_chain_reaches_handler_with_written_state() {
        let route = Route::new(Method::Post, "/comments", |ctx: RequestContext| async move {
            let text = ctx.body().and_then(|b| b["text"].as_str()).unwrap_or_default().to_owned();
            Ok::<_, ApiError>(text)
        })
        .with(ValidateBody::new(BodyShape::new("Dto").required("text", FieldKind::text(1, 20))));

        let ctx = RequestContext::new(Method::Post, "/comments").with_body(r#"{"text":"  hi  "}"#);
        let res = run(&route, ctx).await;

        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"hi");
    }

    #[tokio::test]
    async fn handler_errors_are_mapped() {
        let route = Route::new(Method::Get, "/boom", |_ctx: RequestContext| async {
            Err::<Response, _>(ApiError::from(anyhow::anyhow!("disk on fire")))
        });

        let res = run(&route, RequestContext::new(Method::Get, "/boom")).await;
        assert_eq!(res.status_code(), 500);
    }
}
