use portcullis_types::{AccessError, PipelineStage};
use thiserror::Error;

/// An attempt that failed before reaching a decision.
///
/// Carries the stage it terminated at; the matching audit record is tagged
/// with the same stage and error kind. Infrastructure failures here are
/// deliberately distinct from a deny so operators never confuse the two.
#[derive(Error, Debug)]
#[error("attempt failed at {stage}: {source}")]
pub struct PipelineError {
    /// Stage the attempt terminated at
    pub stage: PipelineStage,

    /// What went wrong
    #[source]
    pub source: AccessError,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, source: AccessError) -> Self {
        Self { stage, source }
    }
}
