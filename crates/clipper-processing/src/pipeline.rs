//! Extraction orchestration: validate → fetch → stage → transcode → store.

use std::sync::Arc;
use std::time::Duration;

use clipper_core::{ExtractionRequest, ExtractionResult, TimeRange};
use clipper_storage::ObjectStorage;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::ExtractionError;
use crate::naming::clip_file_name;
use crate::scratch::ScratchSpace;
use crate::staging::stage;
use crate::transcoder::Transcoder;

/// Limits for the transcode stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_concurrent_transcodes: usize,
    /// How long to wait for a transcode slot. `None` waits until the caller gives up.
    pub queue_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_transcodes: 2,
            queue_timeout: None,
        }
    }
}

/// Runs one extraction per call. Calls are independent and may run concurrently;
/// the only shared state is the transcode slot semaphore.
pub struct ExtractionPipeline {
    storage: Arc<dyn ObjectStorage>,
    transcoder: Arc<dyn Transcoder>,
    scratch: ScratchSpace,
    transcode_slots: Arc<Semaphore>,
    queue_timeout: Option<Duration>,
}

impl ExtractionPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        transcoder: Arc<dyn Transcoder>,
        scratch: ScratchSpace,
        config: PipelineConfig,
    ) -> Self {
        Self {
            storage,
            transcoder,
            scratch,
            transcode_slots: Arc::new(Semaphore::new(config.max_concurrent_transcodes.max(1))),
            queue_timeout: config.queue_timeout,
        }
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Transcode slots not currently in use.
    pub fn available_transcode_slots(&self) -> usize {
        self.transcode_slots.available_permits()
    }

    /// Extract the requested clip and store it next to the destination.
    ///
    /// Every local artifact created along the way is deleted before this returns,
    /// and also when the returned future is dropped part way through.
    #[tracing::instrument(
        skip(self, request),
        fields(
            source_id = %request.source_file_id,
            clip_start = %request.clip_start_time,
            clip_end = %request.clip_end_time,
            destination = %request.destination_folder_id,
        )
    )]
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractionError> {
        let start = std::time::Instant::now();
        let range = TimeRange::parse(&request.clip_start_time, &request.clip_end_time)?;

        let object = self
            .storage
            .fetch(&request.source_file_id)
            .await
            .map_err(ExtractionError::FetchFailed)?;
        tracing::info!(name = %object.name, size_bytes = ?object.size, "Fetched source");

        let source_name = object.name;
        let mut staged = stage(&self.scratch, &source_name, object.content).await?;

        let clip = {
            let _permit = self.acquire_transcode_slot().await?;
            self.transcoder.clip(staged.path(), range).await?
        };

        let file_name = clip_file_name(
            &source_name,
            &request.clip_start_time,
            &request.clip_end_time,
        );
        tracing::info!(file_name = %file_name, size_bytes = clip.len(), "Storing clip");

        let content_length = Some(clip.len());
        let stored = self
            .storage
            .store(
                &file_name,
                &request.destination_folder_id,
                content_length,
                Box::pin(clip),
            )
            .await;

        staged.release();
        let locator = stored.map_err(ExtractionError::StoreFailed)?;

        tracing::info!(
            file_name = %file_name,
            locator = %locator,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Extraction complete"
        );

        Ok(ExtractionResult { locator, file_name })
    }

    async fn acquire_transcode_slot(&self) -> Result<OwnedSemaphorePermit, ExtractionError> {
        let slots = self.transcode_slots.clone();

        let permit = match self.queue_timeout {
            Some(timeout) => tokio::time::timeout(timeout, slots.acquire_owned())
                .await
                .map_err(|_| {
                    tracing::warn!(
                        waited_secs = timeout.as_secs(),
                        "Timed out waiting for a transcode slot"
                    );
                    ExtractionError::Busy {
                        waited_secs: timeout.as_secs(),
                    }
                })?,
            None => slots.acquire_owned().await,
        };

        // The semaphore is never closed.
        permit.map_err(|_| ExtractionError::Busy { waited_secs: 0 })
    }
}
