//! Content agents and the refinement pipeline.
//!
//! A generator writes an explanation with multiple-choice questions, a
//! reviewer judges it, and a failing verdict buys exactly one regeneration.

#![warn(missing_docs)]

pub mod agent;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod reviewer;

#[cfg(test)]
mod testing;

pub use agent::{AgentConfig, ContentGenerator, ContentReviewer};
pub use error::{GenerationError, PipelineError, ReviewError, Stage};
pub use generator::{guideline_for, GradeBand, Generator, GRADE_BANDS};
pub use pipeline::{Pipeline, PipelineState};
pub use reviewer::Reviewer;
