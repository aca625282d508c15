//! Shared application state.

use clipper_core::Config;
use clipper_processing::{ExtractionPipeline, ScratchSpace};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<ExtractionPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<ExtractionPipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn scratch(&self) -> &ScratchSpace {
        self.pipeline.scratch()
    }

    pub fn ffmpeg_path(&self) -> &str {
        self.config.ffmpeg_path()
    }
}
