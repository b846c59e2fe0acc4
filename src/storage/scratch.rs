use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tracing::{debug, warn};

/// A file path owned for the lifetime of one request.
///
/// The file is removed when the guard is dropped. A file that was never created
/// is not an error; any other removal failure is logged and otherwise ignored.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, used as the download name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove scratch file"
            ),
        }
    }
}

/// A body stream that keeps scratch files alive until it is dropped.
///
/// The inner stream is declared first so an open file handle is closed before
/// the guards try to remove the file.
pub struct ScratchStream<S> {
    inner: S,
    _files: Vec<ScratchFile>,
}

impl<S> ScratchStream<S> {
    pub fn new(inner: S, files: Vec<ScratchFile>) -> Self {
        Self {
            inner,
            _files: files,
        }
    }
}

impl<S: Stream + Unpin> Stream for ScratchStream<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
