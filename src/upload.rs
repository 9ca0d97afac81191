//! File persistence for multipart uploads.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::http_error::ApiError;

/// A multipart field read from the request, not yet persisted.
#[derive(Debug)]
pub struct UploadedFile {
    pub field_name: String,
    pub original_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Descriptor of a persisted upload, attached to the request context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub field_name: String,
    /// Generated file name inside the target directory.
    pub filename: String,
    pub path: PathBuf,
    pub size: usize,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists `file` under `target_directory`. Fails with
    /// [`ApiError::UploadFailure`] when the file cannot be stored.
    async fn save(&self, file: UploadedFile, target_directory: &Path) -> Result<StoredFile, ApiError>;
}

/// Writes uploads to the local filesystem as `<uuid>.<ext>`.
#[derive(Clone, Debug, Default)]
pub struct DiskFileStore;

#[async_trait]
impl FileStore for DiskFileStore {
    async fn save(&self, file: UploadedFile, target_directory: &Path) -> Result<StoredFile, ApiError> {
        tokio::fs::create_dir_all(target_directory)
            .await
            .map_err(|e| ApiError::Unknown(e.into()))?;

        let filename = match extension_for(&file) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4().simple()),
            None => Uuid::new_v4().simple().to_string(),
        };
        let path = target_directory.join(&filename);

        tokio::fs::write(&path, &file.data)
            .await
            .map_err(|e| ApiError::upload_failure(format!("Failed to store file: {e}")))?;

        info!(field = %file.field_name, path = %path.display(), size = file.data.len(), "file stored");

        Ok(StoredFile {
            field_name: file.field_name,
            filename,
            path,
            size: file.data.len(),
        })
    }
}

/// Extension from the declared content type, falling back to the client's
/// file name.
fn extension_for(file: &UploadedFile) -> Option<String> {
    let from_mime = file.content_type.as_deref().and_then(|ct| match ct {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    });
    if let Some(ext) = from_mime {
        return Some(ext.to_owned());
    }

    file.original_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, name: Option<&str>) -> UploadedFile {
        UploadedFile {
            field_name: "image".into(),
            original_name: name.map(str::to_owned),
            content_type: content_type.map(str::to_owned),
            data: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn extension_prefers_content_type() {
        assert_eq!(extension_for(&upload(Some("image/png"), Some("a.jpeg"))).as_deref(), Some("png"));
        assert_eq!(extension_for(&upload(None, Some("photo.JPEG"))).as_deref(), Some("jpeg"));
        assert_eq!(extension_for(&upload(None, Some("../../etc/pa$$wd"))), None);
        assert_eq!(extension_for(&upload(None, None)), None);
    }

    #[tokio::test]
    async fn disk_store_writes_under_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("offers");

        let stored = DiskFileStore.save(upload(Some("image/png"), None), &target).await.unwrap();

        assert!(stored.filename.ends_with(".png"));
        assert_eq!(stored.path.parent(), Some(target.as_path()));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"\x89PNG");
    }
}
