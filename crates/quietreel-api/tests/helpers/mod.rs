//! Test helpers: build AppState and router for integration tests.
//!
//! The transcoder is replaced by [`MockTranscoder`], so no ffmpeg binary is needed.
//! Run with: `cargo test -p quietreel-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use quietreel_api::setup::routes;
use quietreel_api::AppState;
use quietreel_core::{Config, MediaProcessorConfig};
use quietreel_processing::{
    completion_channel, TranscodeError, TranscodeHandle, TranscodeInvoker, TranscodeJob,
    TranscodeOutcome,
};
use quietreel_storage::LocalStaging;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Marker the mock prepends to "transcoded" output so tests can tell input and output apart
pub const OUTPUT_MARKER: &[u8] = b"video-only:";

#[derive(Debug, Clone, Copy)]
pub enum MockMode {
    /// Writes `OUTPUT_MARKER` followed by the input bytes and succeeds
    Strip,
    /// Fails without touching the output
    Fail,
    /// Writes a partial output file, then fails
    PartialThenFail,
}

pub struct MockTranscoder {
    mode: MockMode,
    calls: AtomicUsize,
    last_output: Mutex<Option<PathBuf>>,
}

impl MockTranscoder {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            last_output: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_output(&self) -> Option<PathBuf> {
        self.last_output.lock().unwrap().clone()
    }
}

impl TranscodeInvoker for MockTranscoder {
    fn start(&self, job: TranscodeJob) -> TranscodeHandle {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_output.lock().unwrap() = Some(job.output_path.clone());
        let (completer, handle) = completion_channel();
        let mode = self.mode;

        tokio::spawn(async move {
            let outcome = match mode {
                MockMode::Strip => match tokio::fs::read(&job.input_path).await {
                    Ok(input) => {
                        let mut output = OUTPUT_MARKER.to_vec();
                        output.extend_from_slice(&input);
                        match tokio::fs::write(&job.output_path, &output).await {
                            Ok(()) => TranscodeOutcome::Succeeded {
                                output_bytes: output.len() as u64,
                                elapsed: Duration::from_millis(1),
                            },
                            Err(e) => TranscodeOutcome::Failed(TranscodeError::Launch(e.to_string())),
                        }
                    }
                    Err(e) => TranscodeOutcome::Failed(TranscodeError::Launch(e.to_string())),
                },
                MockMode::Fail => TranscodeOutcome::Failed(TranscodeError::NonZeroExit {
                    code: Some(1),
                    stderr: "Invalid data found when processing input".to_string(),
                }),
                MockMode::PartialThenFail => {
                    let _ = tokio::fs::write(&job.output_path, b"partial").await;
                    TranscodeOutcome::Failed(TranscodeError::NonZeroExit {
                        code: Some(1),
                        stderr: "Conversion failed!".to_string(),
                    })
                }
            };
            completer.complete(outcome);
        });

        handle
    }
}

/// Test application: server plus the owned staging directory and mock transcoder.
pub struct TestApp {
    pub server: TestServer,
    pub transcoder: Arc<MockTranscoder>,
    pub staging_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn transcoder_calls(&self) -> usize {
        self.transcoder.calls()
    }

    /// Extension of the output path handed to the most recent transcode
    pub fn last_output_extension(&self) -> Option<String> {
        self.transcoder
            .last_output()
            .and_then(|p| p.extension().map(|e| e.to_string_lossy().into_owned()))
    }

    pub fn staged_files(&self) -> Vec<String> {
        staged_files(&self.staging_dir)
    }

    /// Wait for background releases (after a streamed response) to settle.
    pub async fn wait_for_empty_staging(&self) -> Vec<String> {
        for _ in 0..200 {
            let files = self.staged_files();
            if files.is_empty() {
                return files;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.staged_files()
    }
}

fn staged_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

pub fn test_config(staging_dir: &Path) -> MediaProcessorConfig {
    let staging = staging_dir.to_string_lossy().into_owned();
    MediaProcessorConfig::from_lookup(|key| match key {
        "STAGING_DIR" => Some(staging.clone()),
        "ENVIRONMENT" => Some("test".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Setup test app with an isolated staging directory.
pub async fn setup_test_app(mode: MockMode) -> TestApp {
    setup_test_app_with(mode, |_| {}).await
}

/// Setup test app, adjusting the configuration first (e.g. a lower upload ceiling).
pub async fn setup_test_app_with<F>(mode: MockMode, adjust: F) -> TestApp
where
    F: FnOnce(&mut MediaProcessorConfig),
{
    let temp_dir = tempfile::tempdir().unwrap();
    let staging_dir = temp_dir.path().join("staging");

    let mut media_config = test_config(&staging_dir);
    adjust(&mut media_config);
    let config = Config(Box::new(media_config));

    let staging = LocalStaging::new(config.staging_dir()).await.unwrap();
    let transcoder = Arc::new(MockTranscoder::new(mode));
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(staging),
        transcoder.clone(),
    ));

    let router = routes::setup_routes(&config, state).unwrap();
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        transcoder,
        staging_dir,
        _temp_dir: temp_dir,
    }
}
