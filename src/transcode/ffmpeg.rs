use std::ffi::OsString;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use super::engine::Transcoder;
use super::job::ConversionJob;
use crate::error::TranscodeError;

/// Binary looked up on `PATH` when no explicit path is configured.
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Transcoder backed by the `ffmpeg` command-line tool.
///
/// Each job runs as a child process that is killed if the awaiting future is
/// dropped, so an abandoned request does not leave ffmpeg running.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the argument list for a job.
    ///
    /// Video streams are dropped and the audio is re-encoded at the job bitrate
    /// with the container's default codec.
    pub fn command_args(job: &ConversionJob) -> Vec<OsString> {
        vec![
            "-hide_banner".into(),
            "-nostdin".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            job.input.clone().into_os_string(),
            "-vn".into(),
            "-b:a".into(),
            format!("{}k", job.audio_bitrate_kbps).into(),
            "-f".into(),
            job.format.muxer().into(),
            job.output.clone().into_os_string(),
        ]
    }

    /// Check that the engine can be executed and return its version line.
    pub async fn probe(&self) -> Result<String, TranscodeError> {
        let output = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                message: failure_message(&self.program, output.status.code(), &output.stderr),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    fn spawn_error(&self, e: std::io::Error) -> TranscodeError {
        TranscodeError::Spawn {
            program: self.program.clone(),
            message: e.to_string(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_PATH)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    #[instrument(skip(self, job), fields(
        input = %job.input.display(),
        output = %job.output.display(),
        format = %job.format,
        bitrate_kbps = job.audio_bitrate_kbps
    ))]
    async fn transcode(&self, job: &ConversionJob) -> Result<(), TranscodeError> {
        let start = std::time::Instant::now();
        let args = Self::command_args(job);
        debug!(program = %self.program, ?args, "Starting ffmpeg");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                message: failure_message(&self.program, output.status.code(), &output.stderr),
            });
        }

        if !tokio::fs::try_exists(&job.output).await.unwrap_or(false) {
            return Err(TranscodeError::MissingOutput {
                path: job.output.clone(),
            });
        }

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "ffmpeg conversion finished"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Turn a failed run into a one-line message: exit status plus the last line
/// ffmpeg printed to stderr.
fn failure_message(program: &str, code: Option<i32>, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let last_line = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty());

    let status = match code {
        Some(code) => format!("{} exited with code {}", program, code),
        None => format!("{} was terminated by a signal", program),
    };

    match last_line {
        Some(line) => format!("{}: {}", status, line),
        None => status,
    }
}
