//! Composite output of a pipeline run.

use serde::{Deserialize, Serialize};

use crate::content::ContentSet;
use crate::id::RunId;
use crate::verdict::ReviewVerdict;
use crate::Time;

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Run that produced this result
    pub run_id: RunId,

    /// First generator output
    pub initial_content: ContentSet,

    /// Reviewer verdict on the first output
    pub verdict: ReviewVerdict,

    /// Content handed back to the caller
    pub final_content: ContentSet,

    /// Whether a refinement replaced the first output
    pub refined: bool,

    /// When the run finished
    pub completed_at: Time,
}
