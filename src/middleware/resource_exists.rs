use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::http_error::ApiError;
use crate::middleware::Outcome;

/// A resolved resource, type-erased so one context can hold offers, users or
/// anything else a lookup returns. Read back with
/// [`RequestContext::document`].
#[derive(Clone)]
pub struct Document(Arc<dyn Any + Send + Sync>);

impl Document {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Document(..)")
    }
}

/// Lookup capability consumed by [`ResourceExists`].
///
/// `Ok(None)` means "no such resource" and is turned into a 404; `Err` is an
/// outage and surfaces as a 500.
#[async_trait]
pub trait DocumentLookup: Send + Sync {
    async fn find_document(&self, id: &str) -> anyhow::Result<Option<Document>>;
}

/// Resolves the resource named by a path parameter, or fails with `NotFound`.
pub struct ResourceExists {
    lookup: Arc<dyn DocumentLookup>,
    resource: &'static str,
    param: &'static str,
}

impl ResourceExists {
    pub fn new(lookup: Arc<dyn DocumentLookup>, resource: &'static str, param: &'static str) -> Self {
        Self { lookup, resource, param }
    }

    pub(crate) async fn execute(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let id = ctx.param(self.param).unwrap_or_default().to_owned();

        match self.lookup.find_document(&id).await? {
            Some(document) => {
                ctx.insert_document(self.resource, document);
                Ok(Outcome::Continue)
            }
            None => Err(ApiError::not_found(self.resource, id)),
        }
    }
}
