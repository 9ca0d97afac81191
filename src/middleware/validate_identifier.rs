use crate::context::RequestContext;
use crate::http_error::ApiError;
use crate::middleware::Outcome;
use crate::object_id;

/// Rejects a path parameter that is not a well-formed object id.
///
/// Purely syntactic: whether the resource exists is `ResourceExists`' job.
pub struct ValidateIdentifier {
    param: &'static str,
}

impl ValidateIdentifier {
    pub fn new(param: &'static str) -> Self {
        Self { param }
    }

    pub(crate) fn execute(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let value = ctx.param(self.param).unwrap_or_default();
        if object_id::is_valid(value) {
            Ok(Outcome::Continue)
        } else {
            Err(ApiError::bad_identifier(self.param, value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    fn run(value: Option<&str>) -> Result<Outcome, ApiError> {
        let mut ctx = RequestContext::new(Method::Get, "/offers/x");
        if let Some(value) = value {
            ctx = ctx.with_param("offerId", value);
        }
        ValidateIdentifier::new("offerId").execute(&mut ctx)
    }

    #[test]
    fn accepts_well_formed_ids() {
        assert!(matches!(run(Some("6650f1c2a1b2c3d4e5f60718")), Ok(Outcome::Continue)));
    }

    #[test]
    fn rejects_malformed_or_missing_ids() {
        for bad in [Some("abc"), Some("6650f1c2a1b2c3d4e5f6071g"), Some(""), None] {
            match run(bad) {
                Err(ApiError::BadIdentifier { param, .. }) => assert_eq!(param, "offerId"),
                other => panic!("{bad:?} gave {other:?}"),
            }
        }
    }
}
