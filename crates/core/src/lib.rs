//! Ekalavya core data models.
//!
//! This crate defines the content schema shared by the generator and
//! reviewer agents. Every value is validated when it is constructed, and
//! untrusted model output enters only through the validating constructors.

#![warn(missing_docs)]

// Core identities
mod id;

// Validation
mod error;

// Content and review
mod content;
mod verdict;
mod request;
mod result;

// Re-exports
pub use id::RunId;
pub use error::{snippet, ErrorKind, ValidationError, SNIPPET_LIMIT};
pub use content::{
    ContentSet, Mcq, MAX_MCQS, MIN_EXPLANATION_CHARS, MIN_MCQS, MIN_QUESTION_CHARS, OPTION_COUNT,
};
pub use verdict::{ReviewStatus, ReviewVerdict};
pub use request::{GenerationRequest, Grade, MAX_GRADE, MIN_GRADE, MIN_TOPIC_CHARS};
pub use result::PipelineResult;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
