use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/docvault/documents")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting keys that would
    /// escape the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Existing files may be symlinks; make sure they still resolve inside the base.
        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        fill_new_file(&path, &mut file, &data).await?;

        if let Err(e) = file.sync_all().await {
            discard_partial(&path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                path.display(),
                e
            )));
        }

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let key = storage_key.to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Local storage stream download error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %storage_key, "Local storage delete successful");

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Write `data` into a file this upload just created. A failed write removes
/// the file so the key is free again.
async fn fill_new_file<W>(path: &Path, writer: &mut W, data: &[u8]) -> StorageResult<()>
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = writer.write_all(data).await {
        discard_partial(path).await;
        return Err(StorageError::UploadFailed(format!(
            "Failed to write file {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

async fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove partially written file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;

    async fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap()
    }

    async fn read_back(storage: &LocalStorage, key: &str) -> Vec<u8> {
        let mut stream = storage.download_stream(key).await.unwrap();
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }
        data
    }

    /// Accepts nothing, as if the disk were full.
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_local_storage_upload_download() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;
        let key = "3fa85f64-5717-4562-b3fc-2c963f66afa6/1-report.pdf";

        let url = storage
            .upload_with_key(key, Bytes::from_static(b"%PDF-1.4"), "application/pdf")
            .await
            .unwrap();

        assert_eq!(url, format!("http://localhost:3000/files/{}", key));
        assert_eq!(read_back(&storage, key).await, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_local_storage_never_overwrites() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        storage
            .upload_with_key("u/a.pdf", Bytes::from_static(b"first"), "application/pdf")
            .await
            .unwrap();
        let second = storage
            .upload_with_key("u/a.pdf", Bytes::from_static(b"second"), "application/pdf")
            .await;

        assert!(matches!(second, Err(StorageError::UploadFailed(_))));
        assert_eq!(read_back(&storage, "u/a.pdf").await, b"first");
    }

    #[tokio::test]
    async fn test_failed_write_frees_the_key() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;
        let path = dir.path().join("u/a.pdf");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"%PD").unwrap();

        let result = fill_new_file(&path, &mut FullDisk, b"%PDF-1.4").await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!path.exists());

        storage
            .upload_with_key("u/a.pdf", Bytes::from_static(b"%PDF-1.4"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(read_back(&storage, "u/a.pdf").await, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        let result = storage.download_stream("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .upload_with_key("/etc/passwd", Bytes::from_static(b"x"), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        assert!(matches!(
            storage.download_stream("u/missing.pdf").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_local_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;

        storage
            .upload_with_key("u/gone.docx", Bytes::from_static(b"PK"), "application/zip")
            .await
            .unwrap();
        assert!(dir.path().join("u/gone.docx").exists());

        storage.delete("u/gone.docx").await.unwrap();
        assert!(!dir.path().join("u/gone.docx").exists());

        // Deleting twice is fine
        assert!(storage.delete("u/gone.docx").await.is_ok());
    }

    #[tokio::test]
    async fn test_local_storage_stream_download() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir).await;
        let data = vec![7u8; 200_000];

        storage
            .upload_with_key("u/big.pdf", Bytes::from(data.clone()), "application/pdf")
            .await
            .unwrap();

        assert_eq!(read_back(&storage, "u/big.pdf").await, data);
    }
}
