//! Google Drive backend
//!
//! Talks to the Drive v3 REST API directly. Identifiers are Drive file ids, parents
//! are folder ids and locators are the file's `webViewLink`. The bearer token is
//! supplied by configuration.

use crate::traits::{ByteReader, FetchedObject, ObjectStorage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, LOCATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct FileMetadata {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    id: String,
    name: Option<String>,
    web_view_link: Option<String>,
}

/// Google Drive storage implementation
#[derive(Clone)]
pub struct DriveStorage {
    client: Client,
    access_token: String,
    base_url: String,
}

impl DriveStorage {
    /// Create a new DriveStorage instance
    ///
    /// # Arguments
    /// * `access_token` - OAuth bearer token with the `drive` scope
    /// * `base_url` - API root, normally "https://www.googleapis.com"
    pub fn new(access_token: String, base_url: String) -> StorageResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(DriveStorage {
            client,
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn file_url(&self, id: &str) -> String {
        format!(
            "{}/drive/v3/files/{}",
            self.base_url,
            urlencoding::encode(id)
        )
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/drive/v3/files", self.base_url)
    }

    async fn fetch_name(&self, id: &str) -> StorageResult<String> {
        let response = self
            .client
            .get(self.file_url(id))
            .bearer_auth(&self.access_token)
            .query(&[("fields", "name"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("Metadata request failed: {}", e)))?;

        let response = check_status(response, id, StorageError::DownloadFailed).await?;

        let metadata: FileMetadata = response.json().await.map_err(|e| {
            StorageError::DownloadFailed(format!("Invalid metadata response: {}", e))
        })?;

        Ok(metadata.name)
    }

    /// Open a resumable upload session and return its URL.
    async fn start_upload(
        &self,
        name: &str,
        parent: &str,
        content_length: Option<u64>,
    ) -> StorageResult<String> {
        let mut request = self
            .client
            .post(self.upload_url())
            .bearer_auth(&self.access_token)
            .query(&[
                ("uploadType", "resumable"),
                ("supportsAllDrives", "true"),
                ("fields", "id,name,webViewLink"),
            ])
            .json(&serde_json::json!({
                "name": name,
                "parents": [parent],
            }));

        if let Some(length) = content_length {
            request = request.header("X-Upload-Content-Length", length);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Upload session request failed: {}", e)))?;

        let response = check_status(response, parent, StorageError::UploadFailed).await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                StorageError::UploadFailed("Upload session response has no Location header".to_string())
            })
    }
}

/// Map a non-success response to a storage error, keeping the body for diagnostics.
async fn check_status(
    response: Response,
    subject: &str,
    failure: fn(String) -> StorageError,
) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(StorageError::NotFound(subject.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(failure(format!("Drive returned {}: {}", status, body.trim())))
}

#[async_trait]
impl ObjectStorage for DriveStorage {
    async fn fetch(&self, id: &str) -> StorageResult<FetchedObject> {
        let start = std::time::Instant::now();
        let name = self.fetch_name(id).await?;
        tracing::info!(file_id = %id, name = %name, "Resolved Drive file name");

        let response = self
            .client
            .get(self.file_url(id))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("Download request failed: {}", e)))?;

        let response = check_status(response, id, StorageError::DownloadFailed).await?;
        let size = response.content_length();

        tracing::info!(
            file_id = %id,
            status = %response.status(),
            size_bytes = ?size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Drive download started"
        );

        let file_id = id.to_string();
        let content = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| {
                tracing::error!(file_id = %file_id, error = %e, "Drive stream download error");
                StorageError::DownloadFailed(e.to_string())
            })
        });

        Ok(FetchedObject {
            name,
            size,
            content: Box::pin(content),
        })
    }

    async fn store(
        &self,
        name: &str,
        parent: &str,
        content_length: Option<u64>,
        reader: ByteReader,
    ) -> StorageResult<String> {
        let start = std::time::Instant::now();
        let session_url = self.start_upload(name, parent, content_length).await?;

        let uploaded = Arc::new(AtomicU64::new(0));
        let counter = uploaded.clone();
        let body = tokio_util::io::ReaderStream::new(reader).inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                counter.fetch_add(bytes.len() as u64, Ordering::Relaxed);
            }
        });

        let mut request = self
            .client
            .put(&session_url)
            .bearer_auth(&self.access_token)
            .body(reqwest::Body::wrap_stream(body));

        if let Some(length) = content_length {
            request = request.header(CONTENT_LENGTH, length);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(
                name = %name,
                folder = %parent,
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Drive upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let response = check_status(response, parent, StorageError::UploadFailed).await?;

        let file: UploadedFile = response
            .json()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Invalid upload response: {}", e)))?;

        tracing::info!(
            name = %file.name.as_deref().unwrap_or(name),
            file_id = %file.id,
            folder = %parent,
            size_bytes = uploaded.load(Ordering::Relaxed),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Drive upload successful"
        );

        Ok(file
            .web_view_link
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", file.id)))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Drive
    }
}
