//! Configuration management for the conversion gateway.
//!
//! All settings come from command-line arguments via clap, each of which can
//! also be supplied through an environment variable.
//!
//! # Environment Variables
//!
//! - `API_TOKEN` - Bearer token callers must present (required)
//! - `GATEWAY_HOST` - Server bind address (default: 0.0.0.0)
//! - `GATEWAY_PORT` - Server port (default: 3000)
//! - `GATEWAY_UPLOAD_DIR` - Directory for persisted uploads (default: uploads)
//! - `GATEWAY_OUTPUT_DIR` - Directory for transcoded files (default: outputs)
//! - `GATEWAY_MAX_UPLOAD_BYTES` - Upload size limit (default: 100 MiB)
//! - `GATEWAY_REQUEST_TIMEOUT_SECS` - Request timeout (default: 300)
//! - `GATEWAY_FFMPEG_PATH` - ffmpeg binary (default: ffmpeg)
//! - `GATEWAY_OUTPUT_FORMAT` - webm, ogg or mp3 (default: webm)
//! - `GATEWAY_AUDIO_BITRATE` - Audio bitrate in kbps (default: 64)
//! - `GATEWAY_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::transcode::{OutputFormat, DEFAULT_AUDIO_BITRATE_KBPS, DEFAULT_FFMPEG_PATH};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory for persisted uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default directory for transcoded artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Default upload size limit (100 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Default request timeout in seconds (5 minutes).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Accepted audio bitrate range in kbps.
pub const MIN_AUDIO_BITRATE_KBPS: u32 = 8;
pub const MAX_AUDIO_BITRATE_KBPS: u32 = 512;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Conversion Gateway - transcode uploaded media to compact audio.
///
/// Accepts authenticated multipart uploads on `POST /convert`, runs them
/// through ffmpeg and streams the resulting audio file back.
#[derive(Parser, Debug, Clone)]
#[command(name = "conversion-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GATEWAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GATEWAY_PORT")]
    pub port: u16,

    /// Request timeout in seconds. Covers upload and conversion.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "GATEWAY_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Bearer token required on every conversion request.
    ///
    /// There is no default: the server refuses to start without one.
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Directory where uploads are persisted before conversion.
    #[arg(long, default_value = DEFAULT_UPLOAD_DIR, env = "GATEWAY_UPLOAD_DIR")]
    pub upload_dir: PathBuf,

    /// Directory where transcoded files are written.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, env = "GATEWAY_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Maximum accepted upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "GATEWAY_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: u64,

    // =========================================================================
    // Transcoder Configuration
    // =========================================================================
    /// Path to the ffmpeg binary.
    #[arg(long, default_value = DEFAULT_FFMPEG_PATH, env = "GATEWAY_FFMPEG_PATH")]
    pub ffmpeg_path: String,

    /// Output container: webm, ogg or mp3.
    #[arg(long, default_value_t = OutputFormat::Webm, env = "GATEWAY_OUTPUT_FORMAT")]
    pub output_format: OutputFormat,

    /// Output audio bitrate in kbps.
    #[arg(long, default_value_t = DEFAULT_AUDIO_BITRATE_KBPS, env = "GATEWAY_AUDIO_BITRATE")]
    pub audio_bitrate: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "GATEWAY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match self.api_token.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(
                    "No API token configured. Set --api-token or API_TOKEN".to_string(),
                );
            }
            Some(_) => {}
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        if !(MIN_AUDIO_BITRATE_KBPS..=MAX_AUDIO_BITRATE_KBPS).contains(&self.audio_bitrate) {
            return Err(format!(
                "audio_bitrate must be between {} and {} kbps",
                MIN_AUDIO_BITRATE_KBPS, MAX_AUDIO_BITRATE_KBPS
            ));
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err("ffmpeg_path must not be empty".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the API token, or an empty string if unset (call validate() first).
    pub fn api_token_or_empty(&self) -> &str {
        self.api_token.as_deref().map(str::trim).unwrap_or("")
    }
}

// =============================================================================
// Tests
// =============================================================================
