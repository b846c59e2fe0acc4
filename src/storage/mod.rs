//! Working storage for in-flight conversions.
//!
//! Every request gets its own pair of scratch files: the persisted upload in the
//! upload directory and the transcoded artifact in the output directory. Both are
//! owned by [`ScratchFile`] guards, so whichever way a request ends (success,
//! transcoder failure, client disconnect, timeout) the files are removed when the
//! guards drop.
//!
//! ```text
//!   upload dir                      output dir
//!   ┌──────────────────────────┐    ┌──────────────────┐
//!   │ <uuid>-<sanitised name>  │ ─► │ <uuid>.<ext>     │ ─► response body
//!   └──────────────────────────┘    └──────────────────┘
//!            ScratchFile                ScratchFile
//! ```

mod scratch;
mod workspace;

pub use scratch::{ScratchFile, ScratchStream};
pub use workspace::{sanitize_filename, JobFiles, Workspace};
