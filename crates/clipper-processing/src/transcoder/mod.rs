//! External transcoder boundary.

mod ffmpeg;
mod stream;

use std::path::Path;

use async_trait::async_trait;
use clipper_core::TimeRange;

use crate::error::TranscodeError;

pub use ffmpeg::FfmpegTranscoder;
pub use stream::TranscodeStream;

/// Cuts a time window out of a local media file.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Clip `input` to `range` without re-encoding.
    ///
    /// Returns only after the transcoder has finished successfully. The returned stream
    /// owns the output artifact.
    async fn clip(&self, input: &Path, range: TimeRange) -> Result<TranscodeStream, TranscodeError>;
}
