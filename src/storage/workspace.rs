use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::scratch::ScratchFile;
use crate::error::StorageError;

/// Longest sanitised filename kept in an upload path.
const MAX_FILENAME_LENGTH: usize = 100;

/// Name used when the client filename has nothing usable left after sanitising.
const FALLBACK_FILENAME: &str = "upload";

/// The two directories conversions read from and write to.
///
/// Paths are injected at construction rather than resolved from the process
/// working directory, so tests and deployments can point each instance at its own
/// location.
#[derive(Debug, Clone)]
pub struct Workspace {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

/// Scratch files allocated for one conversion.
#[derive(Debug)]
pub struct JobFiles {
    /// Identifier shared by both file names
    pub id: Uuid,

    /// Where the upload is persisted
    pub input: ScratchFile,

    /// Where the transcoder writes its artifact
    pub output: ScratchFile,
}

impl Workspace {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        for dir in [&self.upload_dir, &self.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::CreateDir {
                    path: dir.clone(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Allocate unique scratch paths for a new conversion.
    ///
    /// The upload keeps a sanitised copy of the client filename after the
    /// identifier so it stays recognisable in logs; the output name is the
    /// identifier plus `extension` and never depends on client input.
    pub fn allocate(&self, original_filename: &str, extension: &str) -> JobFiles {
        let id = Uuid::new_v4();
        let input = self
            .upload_dir
            .join(format!("{}-{}", id, sanitize_filename(original_filename)));
        let output = self.output_dir.join(format!("{}.{}", id, extension));

        debug!(
            job_id = %id,
            input = %input.display(),
            output = %output.display(),
            "Allocated scratch files"
        );

        JobFiles {
            id,
            input: ScratchFile::new(input),
            output: ScratchFile::new(output),
        }
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory parts are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`,
/// and the result is capped in length.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let sanitized: String = base
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}
