//! Credential verification.
//!
//! [`AuthVerifier`] is the capability `RequireAuthentication` calls; the
//! service ships one implementation, [`JwtAuth`], which signs HS256 tokens on
//! login and verifies them on every protected route.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http_error::ApiError;

/// The authenticated identity attached to a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Turns a bearer credential into a [`Principal`].
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Fails with [`ApiError::Unauthorized`] for any credential that does not
    /// verify.
    async fn verify(&self, token: &str) -> Result<Principal, ApiError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    name: String,
    iat: i64,
    exp: i64,
}

/// HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtAuth {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, principal: &Principal) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.id.clone(),
            email: principal.email.clone(),
            name: principal.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

#[async_trait]
impl AuthVerifier for JwtAuth {
    async fn verify(&self, token: &str) -> Result<Principal, ApiError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                ApiError::unauthorized("Invalid token")
            })?;

        let Claims { sub, email, name, .. } = data.claims;
        Ok(Principal { id: sub, email, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            id: "6650f1c2a1b2c3d4e5f60718".into(),
            email: "keks@example.com".into(),
            name: "Keks".into(),
        }
    }

    #[tokio::test]
    async fn issued_token_verifies_to_same_principal() {
        let auth = JwtAuth::new("secret", Duration::hours(1));
        let token = auth.issue(&principal()).unwrap();
        assert_eq!(auth.verify(&token).await.unwrap(), principal());
    }

    #[tokio::test]
    async fn foreign_or_expired_tokens_are_unauthorized() {
        let auth = JwtAuth::new("secret", Duration::hours(1));
        let other = JwtAuth::new("another-secret", Duration::hours(1));
        let expired = JwtAuth::new("secret", Duration::hours(-2));

        let foreign = other.issue(&principal()).unwrap();
        let stale = expired.issue(&principal()).unwrap();

        assert!(matches!(auth.verify(&foreign).await, Err(ApiError::Unauthorized(_))));
        assert!(matches!(auth.verify(&stale).await, Err(ApiError::Unauthorized(_))));
        assert!(matches!(auth.verify("not.a.token").await, Err(ApiError::Unauthorized(_))));
    }
}
