//! Kubernetes health-check routes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Both are mounted at the root by [`app::build_router`](crate::app::build_router).

use crate::context::RequestContext;
use crate::controller::Controller;
use crate::http_error::ApiError;
use crate::method::Method;
use crate::route::Route;

pub fn controller() -> Controller {
    let mut c = Controller::new("HealthController");
    c.add_route(Route::new(Method::Get, "/healthz", liveness))
        .add_route(Route::new(Method::Get, "/readyz", readiness));
    c
}

/// Always `200 ok`: if the process answers HTTP at all, it is alive.
pub async fn liveness(_ctx: RequestContext) -> Result<&'static str, ApiError> {
    Ok("ok")
}

/// `200 ready`. The in-memory services need no warm-up.
pub async fn readiness(_ctx: RequestContext) -> Result<&'static str, ApiError> {
    Ok("ready")
}
