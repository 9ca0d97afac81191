use serde_json::Value;

use crate::context::RequestContext;
use crate::http_error::{ApiError, FieldViolation};
use crate::middleware::Outcome;
use crate::shape::BodyShape;

/// Parses the JSON body and checks it against a [`BodyShape`].
pub struct ValidateBody {
    shape: BodyShape,
}

impl ValidateBody {
    pub fn new(shape: BodyShape) -> Self {
        Self { shape }
    }

    pub(crate) fn execute(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let body: Value = if ctx.raw_body().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(ctx.raw_body()).map_err(|e| {
                ApiError::Validation(vec![FieldViolation::new("body", format!("malformed JSON: {e}"))])
            })?
        };

        let normalized = self.shape.validate(&body).map_err(ApiError::Validation)?;
        ctx.set_body(normalized);
        Ok(Outcome::Continue)
    }
}
