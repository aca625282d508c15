//! Extraction pipeline setup

use anyhow::{Context, Result};
use clipper_core::Config;
use clipper_processing::{ExtractionPipeline, FfmpegTranscoder, PipelineConfig, ScratchSpace};
use clipper_storage::ObjectStorage;
use std::sync::Arc;
use std::time::Duration;

pub fn setup_pipeline(
    config: &Config,
    storage: Arc<dyn ObjectStorage>,
) -> Result<Arc<ExtractionPipeline>> {
    let scratch = ScratchSpace::new(config.scratch_dir()).with_context(|| {
        format!(
            "Failed to create scratch directory {}",
            config.scratch_dir().display()
        )
    })?;

    let transcoder = Arc::new(FfmpegTranscoder::new(
        config.ffmpeg_path().to_string(),
        scratch.clone(),
    ));

    let pipeline_config = PipelineConfig {
        max_concurrent_transcodes: config.max_concurrent_transcodes(),
        queue_timeout: match config.transcode_queue_timeout_secs() {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
    };

    tracing::info!(
        scratch_dir = %scratch.dir().display(),
        ffmpeg_path = %config.ffmpeg_path(),
        max_concurrent_transcodes = pipeline_config.max_concurrent_transcodes,
        queue_timeout_secs = ?pipeline_config.queue_timeout.map(|d| d.as_secs()),
        "Extraction pipeline ready"
    );

    Ok(Arc::new(ExtractionPipeline::new(
        storage,
        transcoder,
        scratch,
        pipeline_config,
    )))
}
