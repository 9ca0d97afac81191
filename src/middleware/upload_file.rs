use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use multer::Multipart;

use crate::context::RequestContext;
use crate::http_error::ApiError;
use crate::middleware::Outcome;
use crate::upload::{FileStore, UploadedFile};

const NO_FILE: &str = "No file uploaded";

/// Reads one `multipart/form-data` field and persists it through a
/// [`FileStore`].
pub struct UploadFile {
    store: Arc<dyn FileStore>,
    target_directory: PathBuf,
    field_name: &'static str,
}

impl UploadFile {
    pub fn new(
        store: Arc<dyn FileStore>,
        target_directory: impl Into<PathBuf>,
        field_name: &'static str,
    ) -> Self {
        Self { store, target_directory: target_directory.into(), field_name }
    }

    pub(crate) async fn execute(&self, ctx: &mut RequestContext) -> Result<Outcome, ApiError> {
        let boundary = ctx
            .header(CONTENT_TYPE.as_str())
            .and_then(|ct| multer::parse_boundary(ct).ok())
            .ok_or_else(|| ApiError::upload_failure(NO_FILE))?;

        let upload = self.read_field(ctx.raw_body().clone(), boundary).await?;
        let stored = self.store.save(upload, &self.target_directory).await?;
        ctx.set_file(stored);
        Ok(Outcome::Continue)
    }

    async fn read_field(&self, body: Bytes, boundary: String) -> Result<UploadedFile, ApiError> {
        let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = Multipart::new(stream, boundary);

        while let Some(field) = multipart.next_field().await.map_err(unreadable)? {
            // Plain form values share the name space with files; only a part
            // with a filename counts as the upload.
            let Some(original_name) = field.file_name().map(str::to_owned) else {
                continue;
            };
            if field.name() != Some(self.field_name) {
                continue;
            }

            let content_type = field.content_type().map(|m| m.to_string());
            let data = field.bytes().await.map_err(unreadable)?;

            if data.is_empty() {
                return Err(ApiError::upload_failure(NO_FILE));
            }

            return Ok(UploadedFile {
                field_name: self.field_name.to_owned(),
                original_name: Some(original_name),
                content_type,
                data,
            });
        }

        Err(ApiError::upload_failure(NO_FILE))
    }
}

fn unreadable(e: multer::Error) -> ApiError {
    ApiError::upload_failure(format!("Malformed multipart body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::upload::DiskFileStore;

    const BOUNDARY: &str = "X-SIX-CITIES";

    fn multipart(field: &str, bytes: &str) -> String {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"flat.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             {bytes}\r\n\
             --{BOUNDARY}--\r\n"
        )
    }

    fn ctx(body: String) -> RequestContext {
        RequestContext::new(Method::Post, "/offers/x/image")
            .with_header("content-type", &format!("multipart/form-data; boundary={BOUNDARY}"))
            .with_body(body)
    }

    #[tokio::test]
    async fn stores_the_named_field() {
        let dir = tempfile::tempdir().unwrap();
        let m = UploadFile::new(Arc::new(DiskFileStore), dir.path(), "image");
        let mut ctx = ctx(multipart("image", "PNGDATA"));

        assert!(matches!(m.execute(&mut ctx).await, Ok(Outcome::Continue)));
        let file = ctx.file().unwrap();
        assert_eq!(file.field_name, "image");
        assert!(file.filename.ends_with(".png"));
        assert_eq!(tokio::fs::read(&file.path).await.unwrap(), b"PNGDATA");
    }

    #[tokio::test]
    async fn absent_field_is_an_upload_failure_and_nothing_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let m = UploadFile::new(Arc::new(DiskFileStore), dir.path(), "image");
        let mut ctx = ctx(multipart("avatar", "PNGDATA"));

        match m.execute(&mut ctx).await {
            Err(ApiError::UploadFailure(msg)) => assert_eq!(msg, NO_FILE),
            other => panic!("unexpected {other:?}"),
        }
        assert!(ctx.file().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn text_part_with_the_field_name_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let m = UploadFile::new(Arc::new(DiskFileStore), dir.path(), "image");
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"image\"\r\n\r\n\
             hello\r\n\
             --{BOUNDARY}--\r\n"
        );
        let mut ctx = ctx(body);

        match m.execute(&mut ctx).await {
            Err(ApiError::UploadFailure(msg)) => assert_eq!(msg, NO_FILE),
            other => panic!("unexpected {other:?}"),
        }
        assert!(ctx.file().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn non_multipart_request_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let m = UploadFile::new(Arc::new(DiskFileStore), dir.path(), "image");
        let mut ctx = RequestContext::new(Method::Post, "/offers/x/image").with_body("{}");

        assert!(matches!(m.execute(&mut ctx).await, Err(ApiError::UploadFailure(_))));
    }
}
