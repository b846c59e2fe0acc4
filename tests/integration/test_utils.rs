//! Test utilities for integration tests.
//!
//! This module provides a scriptable mock transcoder, a multipart body builder
//! and helpers for isolated on-disk workspaces.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use tempfile::TempDir;
use tokio::sync::RwLock;

use conversion_gateway::error::TranscodeError;
use conversion_gateway::transcode::{ConversionJob, Transcoder};
use conversion_gateway::{create_router, RouterConfig, Workspace};

pub const TEST_TOKEN: &str = "test-token-for-bearer-auth";

const BOUNDARY: &str = "----conversion-gateway-test-boundary";

// =============================================================================
// Mock Transcoder with Job Tracking
// =============================================================================

/// What the mock does with each job.
#[derive(Clone)]
pub enum MockBehavior {
    /// Write these bytes as the output
    Produce(Vec<u8>),

    /// Copy the input to the output unchanged
    EchoInput,

    /// Write a partial output, then fail with this message
    Fail(String),

    /// Report success without writing anything
    NoOutput,
}

/// A job as seen by the mock, with the input bytes present at call time.
#[derive(Clone, Debug)]
pub struct RecordedJob {
    pub job: ConversionJob,
    pub input: Option<Vec<u8>>,
}

/// A mock transcoder that records every job it receives.
#[derive(Clone)]
pub struct MockTranscoder {
    behavior: MockBehavior,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
    jobs: Arc<RwLock<Vec<RecordedJob>>>,
}

impl MockTranscoder {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            call_count: Arc::new(AtomicUsize::new(0)),
            jobs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn producing(data: &[u8]) -> Self {
        Self::new(MockBehavior::Produce(data.to_vec()))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(MockBehavior::Fail(message.to_string()))
    }

    /// Wait this long (after reading the input) before acting.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub async fn jobs(&self) -> Vec<RecordedJob> {
        self.jobs.read().await.clone()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    async fn transcode(&self, job: &ConversionJob) -> Result<(), TranscodeError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let input = tokio::fs::read(&job.input).await.ok();
        self.jobs.write().await.push(RecordedJob {
            job: job.clone(),
            input: input.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let write = |data: Vec<u8>| async move {
            tokio::fs::write(&job.output, data)
                .await
                .map_err(|e| TranscodeError::Failed {
                    message: e.to_string(),
                })
        };

        match &self.behavior {
            MockBehavior::Produce(data) => write(data.clone()).await,
            MockBehavior::EchoInput => write(input.unwrap_or_default()).await,
            MockBehavior::Fail(message) => {
                write(b"partial".to_vec()).await?;
                Err(TranscodeError::Failed {
                    message: message.clone(),
                })
            }
            MockBehavior::NoOutput => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Workspace Helpers
// =============================================================================

/// A workspace rooted in its own temporary directory.
///
/// The upload and output directories are not created up front, so tests can
/// observe whether a request touched the filesystem at all.
pub struct TestWorkspace {
    _root: TempDir,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let upload_dir = root.path().join("uploads");
        let output_dir = root.path().join("outputs");
        Self {
            _root: root,
            upload_dir,
            output_dir,
        }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.upload_dir, &self.output_dir)
    }

    /// Number of files currently in the upload and output directories.
    pub fn file_count(&self) -> usize {
        count_files(&self.upload_dir) + count_files(&self.output_dir)
    }

    pub fn dirs_exist(&self) -> bool {
        self.upload_dir.exists() || self.output_dir.exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn count_files(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(Result::ok).count(),
        Err(_) => 0,
    }
}

/// Build a router over `transcoder` and `workspace` with the test token.
pub fn test_router(transcoder: MockTranscoder, workspace: &TestWorkspace) -> Router {
    create_router(transcoder, workspace.workspace(), test_config())
}

/// Router configuration used by most tests.
pub fn test_config() -> RouterConfig {
    RouterConfig::new(TEST_TOKEN).with_tracing(false)
}

// =============================================================================
// Multipart Bodies
// =============================================================================

/// Builds `multipart/form-data` bodies by hand.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finish the body; returns the `Content-Type` header value and the bytes.
    pub fn build(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        (
            format!("multipart/form-data; boundary={}", BOUNDARY),
            self.body,
        )
    }
}

/// Build a `POST /convert` request.
pub fn convert_request(
    authorization: Option<&str>,
    content_type: &str,
    body: Vec<u8>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/convert")
        .header(header::CONTENT_TYPE, content_type);

    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    builder.body(Body::from(body)).unwrap()
}

/// Build an authorized `POST /convert` request uploading one file.
pub fn upload_request(filename: &str, data: &[u8]) -> Request<Body> {
    let (content_type, body) = MultipartBuilder::new().file("file", filename, data).build();
    convert_request(Some(&bearer(TEST_TOKEN)), &content_type, body)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Extract the filename from an `attachment; filename="..."` header value.
pub fn attachment_filename(value: &str) -> Option<&str> {
    value
        .strip_prefix("attachment; filename=\"")?
        .strip_suffix('"')
}
