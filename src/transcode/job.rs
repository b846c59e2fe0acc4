use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default audio bitrate in kbps.
pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 64;

/// Audio container produced by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Webm,
    Ogg,
    Mp3,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Webm => "webm",
            OutputFormat::Ogg => "ogg",
            OutputFormat::Mp3 => "mp3",
        }
    }

    /// Muxer name passed to ffmpeg's `-f`.
    pub fn muxer(&self) -> &'static str {
        match self {
            OutputFormat::Webm => "webm",
            OutputFormat::Ogg => "ogg",
            OutputFormat::Mp3 => "mp3",
        }
    }

    /// `Content-Type` of the produced artifact.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Webm => "audio/webm",
            OutputFormat::Ogg => "audio/ogg",
            OutputFormat::Mp3 => "audio/mpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" => Ok(OutputFormat::Webm),
            "ogg" => Ok(OutputFormat::Ogg),
            "mp3" => Ok(OutputFormat::Mp3),
            other => Err(format!(
                "unsupported output format '{}' (expected webm, ogg or mp3)",
                other
            )),
        }
    }
}

/// One invocation of the transcoder. Never shared between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Persisted upload
    pub input: PathBuf,

    /// Where the artifact must be written
    pub output: PathBuf,

    /// Target container
    pub format: OutputFormat,

    /// Target audio bitrate in kbps
    pub audio_bitrate_kbps: u32,
}

impl ConversionJob {
    pub fn new(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        format: OutputFormat,
        audio_bitrate_kbps: u32,
    ) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            format,
            audio_bitrate_kbps,
        }
    }
}
