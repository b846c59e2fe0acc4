use async_trait::async_trait;

use super::job::ConversionJob;
use crate::error::TranscodeError;

/// An external engine that converts one media file into another.
///
/// Implementations must write the artifact to `job.output` and only return
/// `Ok` once it is fully materialized. There is no retry: an error is final
/// for the request that issued the job.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run the conversion described by `job` to completion.
    async fn transcode(&self, job: &ConversionJob) -> Result<(), TranscodeError>;

    /// Short engine name for logs.
    fn name(&self) -> &str;
}
