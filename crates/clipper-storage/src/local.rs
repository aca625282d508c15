use crate::keys;
use crate::traits::{ByteReader, FetchedObject, ObjectStorage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored objects (e.g., "/var/lib/clipper/media")
    /// * `base_url` - Base URL the directory is served under (e.g., "http://localhost:8080/media")
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

    /// Convert a key to a filesystem path, rejecting keys that resolve outside the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        keys::validate_key(key)?;

        let path = self.base_path.join(key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Symlinks inside the base directory may still point elsewhere.
        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn generate_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            keys::url_path(key)
        )
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn fetch(&self, id: &str) -> StorageResult<FetchedObject> {
        let path = self.key_to_path(id)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(id.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;
        let size = file.metadata().await.ok().map(|meta| meta.len());

        let key = id.to_string();
        let content = tokio_util::io::ReaderStream::new(file).map(move |chunk| {
            chunk.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Local storage stream read error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        tracing::debug!(
            path = %path.display(),
            key = %id,
            size_bytes = ?size,
            "Local storage fetch opened"
        );

        Ok(FetchedObject {
            name: keys::display_name(id).to_string(),
            size,
            content: Box::pin(content),
        })
    }

    async fn store(
        &self,
        name: &str,
        parent: &str,
        _content_length: Option<u64>,
        mut reader: ByteReader,
    ) -> StorageResult<String> {
        let key = keys::destination_key(parent, name)?;
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let copied = tokio::io::copy(&mut reader, &mut file).await;
        let bytes_copied = match copied {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                if let Err(remove_err) = fs::remove_file(&path).await {
                    tracing::warn!(
                        path = %path.display(),
                        error = %remove_err,
                        "Failed to remove partially written file"
                    );
                }
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write stream to file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;
    use tokio::io::{AsyncRead, ReadBuf};

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:8080/media".to_string())
            .await
            .unwrap()
    }

    async fn read_all(object: FetchedObject) -> Vec<u8> {
        let mut content = object.content;
        let mut data = Vec::new();
        while let Some(chunk) = content.next().await {
            data.extend_from_slice(&chunk.unwrap());
        }
        data
    }

    #[tokio::test]
    async fn test_store_then_fetch() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let data = b"twenty arbitrary byt".to_vec();

        let url = storage
            .store(
                "movie_00:01:23_to_00:02:34.mp4",
                "folder1",
                Some(data.len() as u64),
                Box::pin(std::io::Cursor::new(data.clone())),
            )
            .await
            .unwrap();

        assert_eq!(
            url,
            "http://localhost:8080/media/folder1/movie_00%3A01%3A23_to_00%3A02%3A34.mp4"
        );

        let object = storage
            .fetch("folder1/movie_00:01:23_to_00:02:34.mp4")
            .await
            .unwrap();
        assert_eq!(object.name, "movie_00:01:23_to_00:02:34.mp4");
        assert_eq!(object.size, Some(data.len() as u64));
        assert_eq!(read_all(object).await, data);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.fetch("nope/movie.mp4").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.fetch("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.fetch("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .store("passwd", "../etc", None, Box::pin(std::io::Cursor::new(Vec::new())))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::other("reader exploded")))
        }
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .store("clip.mp4", "folder1", None, Box::pin(FailingReader))
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!dir.path().join("folder1/clip.mp4").exists());
    }
}
