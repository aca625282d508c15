use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

use crate::scratch::ScratchFile;

/// Reader over a transcoded artifact.
///
/// The artifact is deleted once the last byte has been read, when [`close`](Self::close)
/// is called, or when the stream is dropped. Nothing else refers to the file.
#[derive(Debug)]
pub struct TranscodeStream {
    file: Option<File>,
    artifact: ScratchFile,
    len: u64,
}

impl TranscodeStream {
    /// Open `artifact` for reading and take ownership of it.
    pub async fn open(artifact: ScratchFile) -> io::Result<Self> {
        let file = File::open(artifact.path()).await?;
        let len = file.metadata().await?.len();

        Ok(Self {
            file: Some(file),
            artifact,
            len,
        })
    }

    /// Size of the artifact in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        self.artifact.path()
    }

    pub fn is_closed(&self) -> bool {
        self.artifact.is_released()
    }

    /// Stop reading and delete the artifact. Later calls do nothing.
    pub fn close(&mut self) {
        self.file = None;
        self.artifact.release();
    }
}

impl AsyncRead for TranscodeStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let Some(file) = self.file.as_mut() else {
            return Poll::Ready(Ok(()));
        };

        let before = buf.filled().len();
        match Pin::new(file).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                if buf.filled().len() == before && buf.remaining() > 0 {
                    tracing::debug!(path = %self.artifact.path().display(), "Transcode stream fully read");
                    self.close();
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
