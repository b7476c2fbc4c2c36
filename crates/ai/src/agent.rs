//! Agent seams and their configuration.

use async_trait::async_trait;
use ekalavya_core::{ContentSet, GenerationRequest, Grade, ReviewVerdict};
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, ReviewError};
use crate::generator::Generator;
use crate::reviewer::Reviewer;

/// Produces content for a topic and grade.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a validated content set.
    ///
    /// Feedback on the request is addressed by regenerating from scratch.
    async fn generate(&self, request: &GenerationRequest) -> Result<ContentSet, GenerationError>;
}

/// Judges generated content.
#[async_trait]
pub trait ContentReviewer: Send + Sync {
    /// Evaluate content and return a validated verdict.
    async fn evaluate(
        &self,
        grade: Grade,
        topic: &str,
        content: &ContentSet,
    ) -> Result<ReviewVerdict, ReviewError>;
}

/// Sampling settings for the two agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Generator temperature (favors varied phrasing)
    #[serde(default = "default_generator_temperature")]
    pub generator_temperature: f64,

    /// Reviewer temperature (favors repeatable judgments)
    #[serde(default = "default_reviewer_temperature")]
    pub reviewer_temperature: f64,
}

fn default_generator_temperature() -> f64 {
    Generator::DEFAULT_TEMPERATURE
}

fn default_reviewer_temperature() -> f64 {
    Reviewer::DEFAULT_TEMPERATURE
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generator_temperature: default_generator_temperature(),
            reviewer_temperature: default_reviewer_temperature(),
        }
    }
}
