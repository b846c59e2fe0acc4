//! # Conversion Gateway
//!
//! An authenticated HTTP service that accepts an uploaded media file, converts
//! it to low-bitrate compressed audio with ffmpeg and streams the result back.
//!
//! ## Flow
//!
//! ```text
//! bearer auth ─► multipart upload ─► scratch file ─► ffmpeg ─► streamed response
//!                                                              │
//!                                      scratch files removed ◄─┘
//! ```
//!
//! ## Modules
//!
//! - [`server`] - Axum router, bearer auth middleware and handlers
//! - [`transcode`] - The [`Transcoder`] seam and the ffmpeg implementation
//! - [`storage`] - Injected working directories and self-removing scratch files
//! - [`config`] - CLI and environment configuration
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use conversion_gateway::{create_router, FfmpegTranscoder, RouterConfig, Workspace};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = create_router(
//!         FfmpegTranscoder::default(),
//!         Workspace::new("uploads", "outputs"),
//!         RouterConfig::new("my-secret-token"),
//!     );
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod transcode;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConvertError, StorageError, TranscodeError};
pub use server::{
    auth_middleware, convert_handler, create_router, health_handler, AppState, AuthError,
    BearerAuth, ErrorResponse, HealthResponse, RouterConfig,
};
pub use storage::{sanitize_filename, JobFiles, ScratchFile, ScratchStream, Workspace};
pub use transcode::{
    ConversionJob, FfmpegTranscoder, OutputFormat, Transcoder, DEFAULT_AUDIO_BITRATE_KBPS,
    DEFAULT_FFMPEG_PATH,
};
