//! Clipper Processing Library
//!
//! The extraction pipeline: stage a remote object locally, cut a time window out of it
//! with an external transcoder and stream the result back to an object store. Every
//! temporary artifact is a [`ScratchFile`] and is deleted on every exit path.

pub mod error;
pub mod naming;
pub mod pipeline;
pub mod scratch;
pub mod staging;
pub mod transcoder;

pub use error::{ExtractionError, StagingError, TranscodeError};
pub use naming::{clip_file_name, file_extension};
pub use pipeline::{ExtractionPipeline, PipelineConfig};
pub use scratch::{ScratchFile, ScratchSpace};
pub use staging::{stage, StagedFile};
pub use transcoder::{FfmpegTranscoder, TranscodeStream, Transcoder};
