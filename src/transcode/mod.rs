//! Transcoding layer.
//!
//! The conversion itself is delegated to an external engine behind the
//! [`Transcoder`] trait. The production implementation drives the `ffmpeg`
//! binary as a child process; tests plug in their own implementations.
//!
//! ```text
//! ┌──────────────┐   ConversionJob    ┌──────────────────┐
//! │   handler    │ ─────────────────► │    Transcoder    │
//! │ (/convert)   │ ◄───────────────── │ (FfmpegTranscoder│
//! └──────────────┘  Ok / TranscodeErr │  or a test impl) │
//!                                     └──────────────────┘
//! ```

mod engine;
mod ffmpeg;
mod job;

pub use engine::Transcoder;
pub use ffmpeg::{FfmpegTranscoder, DEFAULT_FFMPEG_PATH};
pub use job::{ConversionJob, OutputFormat, DEFAULT_AUDIO_BITRATE_KBPS};
