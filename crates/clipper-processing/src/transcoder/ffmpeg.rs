//! FFmpeg-backed transcoder.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use clipper_core::{format_hhmmss, TimeRange};
use tokio::process::Command;

use super::{TranscodeStream, Transcoder};
use crate::error::TranscodeError;
use crate::naming::local_extension;
use crate::scratch::ScratchSpace;

const OUTPUT_PREFIX: &str = "clipper-clip-";
const DEFAULT_EXTENSION: &str = "mp4";

pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    scratch: ScratchSpace,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String, scratch: ScratchSpace) -> Self {
        Self {
            ffmpeg_path,
            scratch,
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    /// Arguments for a stream-copy cut of `range` from `input` into `output`.
    ///
    /// The seek is placed before `-i`, so it lands on the nearest keyframe rather than
    /// the exact frame. The clip length is passed as a duration, not an end offset.
    pub fn build_args(input: &Path, output: &Path, range: &TimeRange) -> Vec<String> {
        vec![
            "-noaccurate_seek".to_string(),
            "-ss".to_string(),
            format_hhmmss(range.start),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-t".to_string(),
            format_hhmmss(range.duration()),
            "-avoid_negative_ts".to_string(),
            "make_zero".to_string(),
            "-y".to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    #[tracing::instrument(skip(self, input), fields(input = %input.display()))]
    async fn clip(&self, input: &Path, range: TimeRange) -> Result<TranscodeStream, TranscodeError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(TranscodeError::SourceNotFound(input.to_path_buf()));
        }

        let extension = input
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(local_extension)
            .unwrap_or(DEFAULT_EXTENSION);

        let (output, file) = self
            .scratch
            .allocate(OUTPUT_PREFIX, Some(extension))
            .map_err(TranscodeError::Output)?;
        drop(file);

        let args = Self::build_args(input, output.path(), &range);
        tracing::info!(
            command = %format!("{} {}", self.ffmpeg_path, args.join(" ")),
            "Running transcoder"
        );

        let start = std::time::Instant::now();
        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(TranscodeError::Spawn)?;

        if !result.status.success() {
            let diagnostics = String::from_utf8_lossy(&result.stderr).trim().to_string();
            tracing::error!(
                status = %result.status,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                diagnostics = %diagnostics,
                "Transcoder failed"
            );
            return Err(TranscodeError::Failed {
                status: result.status.to_string(),
                diagnostics,
            });
        }

        let stream = TranscodeStream::open(output)
            .await
            .map_err(TranscodeError::Output)?;

        tracing::info!(
            output = %stream.path().display(),
            size_bytes = stream.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Transcoder finished"
        );

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn range(start: u64, end: u64) -> TimeRange {
        TimeRange {
            start: Duration::from_secs(start),
            end: Duration::from_secs(end),
        }
    }

    #[test]
    fn test_build_args() {
        let args = FfmpegTranscoder::build_args(
            &PathBuf::from("/tmp/clipper-staged-abc.mp4"),
            &PathBuf::from("/tmp/clipper-clip-def.mp4"),
            &range(83, 154),
        );

        assert_eq!(
            args,
            vec![
                "-noaccurate_seek",
                "-ss",
                "00:01:23",
                "-i",
                "/tmp/clipper-staged-abc.mp4",
                "-t",
                "00:01:11",
                "-avoid_negative_ts",
                "make_zero",
                "-y",
                "-c",
                "copy",
                "/tmp/clipper-clip-def.mp4",
            ]
        );
    }

    #[test]
    fn test_build_args_uses_duration_not_end() {
        let args = FfmpegTranscoder::build_args(
            Path::new("in.mkv"),
            Path::new("out.mkv"),
            &range(3600, 3690),
        );

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[ss + 1], "01:00:00");
        assert_eq!(args[t + 1], "00:01:30");
        assert!(ss < args.iter().position(|a| a == "-i").unwrap());
    }

    #[tokio::test]
    async fn test_missing_source_is_reported_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new(
            "/nonexistent/ffmpeg".to_string(),
            ScratchSpace::new(dir.path()).unwrap(),
        );

        let result = transcoder
            .clip(&dir.path().join("missing.mp4"), range(0, 10))
            .await;

        assert!(matches!(result, Err(TranscodeError::SourceNotFound(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_spawn_failure_releases_output() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch")).unwrap();
        let input = dir.path().join("movie.mp4");
        std::fs::write(&input, b"not really a movie").unwrap();

        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg".to_string(), scratch.clone());
        let result = transcoder.clip(&input, range(0, 10)).await;

        assert!(matches!(result, Err(TranscodeError::Spawn(_))));
        assert_eq!(std::fs::read_dir(scratch.dir()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    mod stub_process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tokio::io::AsyncReadExt;

        /// Write an executable shell script standing in for ffmpeg.
        fn stub(dir: &Path, body: &str) -> String {
            let path = dir.join("ffmpeg-stub.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        }

        #[tokio::test]
        async fn test_successful_run_streams_output() {
            let dir = tempfile::tempdir().unwrap();
            let scratch = ScratchSpace::new(dir.path().join("scratch")).unwrap();
            let input = dir.path().join("movie.mp4");
            std::fs::write(&input, b"source").unwrap();

            // The output path is the last argument.
            let ffmpeg = stub(
                dir.path(),
                r#"for last; do :; done; printf '%s|%s|%s' "$3" "$7" "$5" > "$last""#,
            );

            let transcoder = FfmpegTranscoder::new(ffmpeg, scratch.clone());
            let mut stream = transcoder.clip(&input, range(83, 154)).await.unwrap();

            assert_eq!(stream.path().extension().unwrap(), "mp4");

            let mut output = String::new();
            stream.read_to_string(&mut output).await.unwrap();
            assert_eq!(
                output,
                format!("00:01:23|00:01:11|{}", input.display())
            );
            assert_eq!(std::fs::read_dir(scratch.dir()).unwrap().count(), 0);
        }

        #[tokio::test]
        async fn test_failed_run_carries_diagnostics_and_cleans_up() {
            let dir = tempfile::tempdir().unwrap();
            let scratch = ScratchSpace::new(dir.path().join("scratch")).unwrap();
            let input = dir.path().join("movie.mp4");
            std::fs::write(&input, b"source").unwrap();

            let ffmpeg = stub(
                dir.path(),
                "echo 'movie.mp4: Invalid data found when processing input' >&2; exit 1",
            );

            let transcoder = FfmpegTranscoder::new(ffmpeg, scratch.clone());
            let result = transcoder.clip(&input, range(0, 10)).await;

            match result {
                Err(TranscodeError::Failed { diagnostics, .. }) => {
                    assert_eq!(
                        diagnostics,
                        "movie.mp4: Invalid data found when processing input"
                    );
                }
                other => panic!("expected transcoder failure, got {:?}", other),
            }
            assert_eq!(std::fs::read_dir(scratch.dir()).unwrap().count(), 0);
        }
    }
}
