//! Materialize a remote object on local disk.

use std::path::Path;

use clipper_storage::ByteStream;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::StagingError;
use crate::naming::local_extension;
use crate::scratch::{ScratchFile, ScratchSpace};

const STAGED_PREFIX: &str = "clipper-staged-";

/// Local copy of a source object. The file is deleted when this is released or dropped.
#[derive(Debug)]
pub struct StagedFile {
    scratch: ScratchFile,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.scratch.path()
    }

    /// Bytes written to the staged copy.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn release(&mut self) {
        self.scratch.release();
    }
}

/// Drain `content` into a new scratch file that keeps the extension of `name_hint`.
///
/// The whole stream is consumed before this returns. On error the partial file is removed.
pub async fn stage(
    space: &ScratchSpace,
    name_hint: &str,
    mut content: ByteStream,
) -> Result<StagedFile, StagingError> {
    let start = std::time::Instant::now();
    let (scratch, mut file) = space
        .allocate(STAGED_PREFIX, local_extension(name_hint))
        .map_err(StagingError::Create)?;

    tracing::info!(name = %name_hint, path = %scratch.path().display(), "Staging source locally");

    let write_error = |source| StagingError::Write {
        path: scratch.path().to_path_buf(),
        source,
    };

    let mut size = 0u64;
    while let Some(chunk) = content.next().await {
        let chunk = chunk.map_err(|source| StagingError::Read {
            bytes_written: size,
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_error)?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(write_error)?;
    drop(file);

    tracing::info!(
        name = %name_hint,
        path = %scratch.path().display(),
        size_bytes = size,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Finished staging source"
    );

    Ok(StagedFile { scratch, size })
}
