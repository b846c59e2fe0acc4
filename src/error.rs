use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing or writing scratch files in the workspace.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// A working directory could not be created
    #[error("Failed to create directory {path}: {message}")]
    CreateDir { path: PathBuf, message: String },

    /// Upload bytes could not be written to disk
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// The transcoded artifact could not be opened for streaming
    #[error("Failed to open {path}: {message}")]
    Open { path: PathBuf, message: String },
}

/// Errors reported by the external transcoding engine.
#[derive(Debug, Clone, Error)]
pub enum TranscodeError {
    /// The engine binary could not be started at all
    #[error("Cannot run {program}: {message}")]
    Spawn { program: String, message: String },

    /// The engine ran and reported failure
    #[error("{message}")]
    Failed { message: String },

    /// The engine exited cleanly but left no output behind
    #[error("Transcoder finished without producing {path}")]
    MissingOutput { path: PathBuf },
}

/// Errors that end a conversion request before the response body is sent.
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    /// The request carried no file part
    #[error("Nenhum arquivo enviado")]
    NoFile,

    /// The uploaded file exceeded the configured limit (should map to HTTP 413)
    #[error("Arquivo excede o limite de {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// The multipart body could not be read
    #[error("{0}")]
    Multipart(String),

    /// Working directory or scratch file failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Transcoder failure
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}
