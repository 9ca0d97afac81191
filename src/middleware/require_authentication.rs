use std::sync::Arc;

use http::header::AUTHORIZATION;

use crate::auth::AuthVerifier;
use crate::context::RequestContext;
use crate::http_error::ApiError;
use crate::middleware::Outcome;

/// Verifies `Authorization: Bearer <token>` and attaches the principal.
pub struct RequireAuthentication {
    verifier: Arc<dyn AuthVerifier>,
}

impl RequireAuthentication {
    pub fn new(verifier: Arc<dyn AuthVerifier>) -> Self {
        Self { verifier }
    }

    pub(crate) async fn execute(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let token = ctx
            .header(AUTHORIZATION.as_str())
            .and_then(bearer_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?
            .to_owned();

        let principal = self.verifier.verify(&token).await?;
        ctx.set_principal(principal);
        Ok(Outcome::Continue)
    }
}

/// Token of a `Bearer` credential. The scheme name is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtAuth, Principal};
    use crate::method::Method;

    fn auth() -> Arc<JwtAuth> {
        Arc::new(JwtAuth::new("test-secret", chrono::Duration::hours(1)))
    }

    fn principal() -> Principal {
        Principal { id: "6650f1c2a1b2c3d4e5f60718".into(), email: "a@b.co".into(), name: "A".into() }
    }

    #[tokio::test]
    async fn valid_token_sets_principal() {
        let auth = auth();
        let token = auth.issue(&principal()).unwrap();
        let mut ctx = RequestContext::new(Method::Post, "/offers")
            .with_header("authorization", &format!("Bearer {token}"));

        let m = RequireAuthentication::new(auth);
        assert!(matches!(m.execute(&mut ctx).await, Ok(Outcome::Continue)));
        assert_eq!(ctx.principal(), Some(&principal()));
    }

    #[tokio::test]
    async fn scheme_name_is_case_insensitive() {
        let auth = auth();
        let token = auth.issue(&principal()).unwrap();
        let m = RequireAuthentication::new(auth);

        for scheme in ["bearer", "BEARER", "bEaReR"] {
            let mut ctx = RequestContext::new(Method::Post, "/offers")
                .with_header("authorization", &format!("{scheme} {token}"));
            assert!(matches!(m.execute(&mut ctx).await, Ok(Outcome::Continue)), "{scheme}");
            assert_eq!(ctx.principal(), Some(&principal()));
        }
    }

    #[tokio::test]
    async fn missing_or_invalid_credentials_leave_principal_unset() {
        let m = RequireAuthentication::new(auth());

        for header in [None, Some("Basic abc"), Some("Bearer "), Some("Bearer forged.token.value")] {
            let mut ctx = RequestContext::new(Method::Post, "/offers");
            if let Some(h) = header {
                ctx = ctx.with_header("authorization", h);
            }
            assert!(matches!(m.execute(&mut ctx).await, Err(ApiError::Unauthorized(_))), "{header:?}");
            assert!(ctx.principal().is_none());
        }
    }
}
