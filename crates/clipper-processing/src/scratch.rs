//! Temporary artifacts on local disk.
//!
//! A [`ScratchFile`] owns one uniquely named file inside a [`ScratchSpace`]. The file
//! is deleted when the handle is released or dropped, whichever comes first. Release
//! is idempotent and never fails: deletion errors are logged.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

/// Directory that scratch files are allocated in.
#[derive(Debug, Clone)]
pub struct ScratchSpace {
    dir: PathBuf,
}

impl ScratchSpace {
    /// Use `dir` for scratch files, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create a new empty file named `{prefix}{random}[.{extension}]`.
    ///
    /// Returns the handle together with the open file for writing.
    pub fn allocate(
        &self,
        prefix: &str,
        extension: Option<&str>,
    ) -> io::Result<(ScratchFile, tokio::fs::File)> {
        let suffix = extension.map(|ext| format!(".{}", ext)).unwrap_or_default();

        let named = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let (file, path) = named.into_parts();

        tracing::debug!(path = %path.display(), "Created scratch file");

        Ok((ScratchFile::new(path), tokio::fs::File::from_std(file)))
    }

    /// Check that a file can be created and removed in the scratch directory.
    pub fn probe(&self) -> io::Result<()> {
        let (mut scratch, file) = self.allocate(".clipper-probe-", None)?;
        drop(file);
        scratch.release();
        Ok(())
    }
}

/// Handle to a temporary file that is deleted on release.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ScratchFile {
    fn new(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.temp.is_none()
    }

    /// Delete the file. Later calls do nothing.
    pub fn release(&mut self) {
        let Some(temp) = self.temp.take() else {
            tracing::debug!(path = %self.path.display(), "Scratch file already released");
            return;
        };

        match temp.close() {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Deleted scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Scratch file was already gone")
            }
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to delete scratch file"
            ),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.temp.is_some() {
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_allocate_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let space = ScratchSpace::new(dir.path()).unwrap();

        let (scratch, _file) = space.allocate("clipper-staged-", Some("mp4")).unwrap();
        let name = scratch.path().file_name().unwrap().to_str().unwrap();

        assert!(name.starts_with("clipper-staged-"));
        assert!(name.ends_with(".mp4"));
        assert!(scratch.path().exists());
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let space = ScratchSpace::new(dir.path()).unwrap();

        let (a, _) = space.allocate("clipper-", Some("mp4")).unwrap();
        let (b, _) = space.allocate("clipper-", Some("mp4")).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_release_is_idempotent_and_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let space = ScratchSpace::new(dir.path()).unwrap();

        let (mut first, _) = space.allocate("clipper-", None).unwrap();
        let (second, _) = space.allocate("clipper-", None).unwrap();

        first.release();
        first.release();

        assert!(first.is_released());
        assert!(!first.path().exists());
        assert!(second.path().exists());
        assert_eq!(entries(dir.path()), 1);
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let space = ScratchSpace::new(dir.path()).unwrap();

        let (mut scratch, file) = space.allocate("clipper-", None).unwrap();
        drop(file);
        std::fs::remove_file(scratch.path()).unwrap();

        scratch.release();
        assert!(scratch.is_released());
    }

    #[tokio::test]
    async fn test_drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let space = ScratchSpace::new(dir.path()).unwrap();

        let (scratch, file) = space.allocate("clipper-", Some("mkv")).unwrap();
        let path = scratch.path().to_path_buf();
        drop(file);
        drop(scratch);

        assert!(!path.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_probe_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let space = ScratchSpace::new(dir.path().join("nested")).unwrap();

        space.probe().unwrap();
        assert_eq!(entries(space.dir()), 0);
    }
}
