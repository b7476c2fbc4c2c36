//! Agent and pipeline errors.

use ekalavya_core::{snippet, ErrorKind, ValidationError};
use ekalavya_llm::CapabilityError;
use std::fmt;
use std::time::Duration;

/// Errors raised by a generator.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The capability call failed or returned non-JSON
    #[error("generation call failed: {0}")]
    Capability(#[from] CapabilityError),

    /// The model produced JSON that is not a valid content set
    #[error("generated content failed validation: {source}; content: {snippet}")]
    Validation {
        /// Violated invariant
        source: ValidationError,
        /// Truncated raw model output
        snippet: String,
    },
}

impl GenerationError {
    pub(crate) fn invalid(source: ValidationError, raw: &serde_json::Value) -> Self {
        Self::Validation {
            source,
            snippet: snippet(&raw.to_string()),
        }
    }

    /// Classified kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Capability(err) => err.kind(),
            GenerationError::Validation { .. } => ErrorKind::Validation,
        }
    }
}

/// Errors raised by a reviewer.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The capability call failed or returned non-JSON
    #[error("review call failed: {0}")]
    Capability(#[from] CapabilityError),

    /// The model produced JSON that is not a valid verdict
    #[error("review verdict failed validation: {source}; content: {snippet}")]
    Validation {
        /// Violated invariant
        source: ValidationError,
        /// Truncated raw model output
        snippet: String,
    },
}

impl ReviewError {
    pub(crate) fn invalid(source: ValidationError, raw: &serde_json::Value) -> Self {
        Self::Validation {
            source,
            snippet: snippet(&raw.to_string()),
        }
    }

    /// Classified kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReviewError::Capability(err) => err.kind(),
            ReviewError::Validation { .. } => ErrorKind::Validation,
        }
    }
}

/// Which generation call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// First attempt, without feedback
    Initial,
    /// The single retry carrying reviewer feedback
    Refinement,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Initial => write!(f, "initial"),
            Stage::Refinement => write!(f, "refinement"),
        }
    }
}

/// A terminal failure of one pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Grade or topic out of bounds
    #[error("invalid input: {0}")]
    Input(ValidationError),

    /// A generation call failed
    #[error("{stage} generation failed: {source}")]
    Generation {
        /// Which call failed
        stage: Stage,
        /// Cause
        source: GenerationError,
    },

    /// The review call failed (distinct from a failing verdict)
    #[error("review failed: {0}")]
    Review(#[from] ReviewError),

    /// The caller's deadline elapsed
    #[error("run did not finish within {0:?}")]
    Timeout(Duration),

    /// The run was cancelled before it finished
    #[error("run was cancelled before completing")]
    Abandoned,
}

impl PipelineError {
    /// Classified kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Input(_) => ErrorKind::Input,
            PipelineError::Generation { source, .. } => source.kind(),
            PipelineError::Review(err) => err.kind(),
            PipelineError::Timeout(_) | PipelineError::Abandoned => ErrorKind::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_error_carries_snippet() {
        let raw = json!({ "explanation": "short" });
        let err = GenerationError::invalid(ValidationError::new("mcqs", "missing"), &raw);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("short"));
        assert!(err.to_string().contains("mcqs: missing"));
    }

    #[test]
    fn test_pipeline_kinds() {
        let input = PipelineError::Input(ValidationError::new("grade", "out of range"));
        assert_eq!(input.kind(), ErrorKind::Input);

        let malformed = PipelineError::Review(ReviewError::Capability(
            CapabilityError::MalformedResponse {
                reason: "expected value".to_string(),
                snippet: "nope".to_string(),
            },
        ));
        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);

        let generation = PipelineError::Generation {
            stage: Stage::Refinement,
            source: GenerationError::Capability(CapabilityError::EmptyResponse),
        };
        assert_eq!(generation.kind(), ErrorKind::Capability);
        assert!(generation.to_string().starts_with("refinement generation failed"));

        assert_eq!(
            PipelineError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Timeout
        );
    }
}
