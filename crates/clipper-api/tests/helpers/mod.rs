//! Test helpers: build AppState and router for integration tests.
//!
//! Storage is the local backend under a temp dir; the transcoder is a fake that never
//! spawns a process.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use clipper_api::setup::{routes, storage};
use clipper_api::AppState;
use clipper_core::{ClipperConfig, Config, TimeRange};
use clipper_processing::{
    ExtractionPipeline, PipelineConfig, ScratchSpace, TranscodeError, TranscodeStream, Transcoder,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

pub const BASE_URL: &str = "http://localhost:8080/media";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    /// Writes `clip:` followed by the input bytes.
    Succeed,
    /// Exits unsuccessfully with diagnostics mentioning the input path.
    Fail,
    /// Never returns.
    Hang,
}

pub struct FakeTranscoder {
    scratch: ScratchSpace,
    behavior: FakeBehavior,
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn clip(&self, input: &Path, _range: TimeRange) -> Result<TranscodeStream, TranscodeError> {
        match self.behavior {
            FakeBehavior::Succeed => {}
            FakeBehavior::Fail => {
                return Err(TranscodeError::Failed {
                    status: "exit status: 1".to_string(),
                    diagnostics: format!("{}: Invalid data found", input.display()),
                });
            }
            FakeBehavior::Hang => std::future::pending::<()>().await,
        }

        let data = tokio::fs::read(input)
            .await
            .map_err(TranscodeError::Output)?;
        let (output, mut file) = self
            .scratch
            .allocate("fake-clip-", Some("mp4"))
            .map_err(TranscodeError::Output)?;
        file.write_all(b"clip:").await.map_err(TranscodeError::Output)?;
        file.write_all(&data).await.map_err(TranscodeError::Output)?;
        file.flush().await.map_err(TranscodeError::Output)?;
        drop(file);

        TranscodeStream::open(output)
            .await
            .map_err(TranscodeError::Output)
    }
}

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub storage_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Put a source object into the storage backend.
    pub fn put_source(&self, key: &str, data: &[u8]) {
        let path = self.storage_dir.join(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, data).unwrap();
    }

    pub fn read_stored(&self, key: &str) -> Vec<u8> {
        std::fs::read(self.storage_dir.join(key)).unwrap()
    }

    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(&self.scratch_dir).unwrap().count()
    }
}

pub struct TestAppBuilder {
    behavior: FakeBehavior,
    vars: HashMap<String, String>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            behavior: FakeBehavior::Succeed,
            vars: HashMap::new(),
        }
    }

    pub fn transcoder(mut self, behavior: FakeBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub async fn build(self) -> TestApp {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage_dir = temp_dir.path().join("storage");
        let scratch_dir = temp_dir.path().join("scratch");

        let mut vars = self.vars;
        vars.insert("STORAGE_BACKEND".into(), "local".into());
        vars.insert(
            "LOCAL_STORAGE_PATH".into(),
            storage_dir.to_string_lossy().to_string(),
        );
        vars.insert("LOCAL_STORAGE_BASE_URL".into(), BASE_URL.into());
        vars.insert(
            "SCRATCH_DIR".into(),
            scratch_dir.to_string_lossy().to_string(),
        );
        vars.entry("FFMPEG_PATH".into())
            .or_insert_with(|| "/nonexistent/ffmpeg".into());

        let config = Config(Box::new(
            ClipperConfig::from_vars(|key| vars.get(key).cloned()).unwrap(),
        ));

        let storage = storage::setup_storage(&config).await.unwrap();
        let scratch = ScratchSpace::new(config.scratch_dir()).unwrap();
        let transcoder = Arc::new(FakeTranscoder {
            scratch: scratch.clone(),
            behavior: self.behavior,
        });
        let pipeline = Arc::new(ExtractionPipeline::new(
            storage,
            transcoder,
            scratch,
            PipelineConfig::default(),
        ));

        let state = Arc::new(AppState::new(config.clone(), pipeline));
        let app = routes::setup_routes(&config, state);
        let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

        TestApp {
            server,
            storage_dir,
            scratch_dir,
            _temp_dir: temp_dir,
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    TestAppBuilder::new().build().await
}
