//! Content reviewer agent.

use async_trait::async_trait;
use ekalavya_core::{ContentSet, Grade, ReviewVerdict};
use ekalavya_llm::TextGenerationCapability;
use std::sync::Arc;
use tracing::debug;

use crate::agent::ContentReviewer;
use crate::error::ReviewError;

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert educational content reviewer.

YOUR TASK:
Evaluate educational content against three criteria:

1. AGE APPROPRIATENESS
   - Vocabulary matches the grade level
   - Sentence complexity is appropriate
   - Examples are relatable for the age group

2. CONCEPTUAL CORRECTNESS
   - Facts are accurate
   - Definitions are precise
   - Examples are valid

3. CLARITY
   - The explanation is coherent and logical
   - Questions test understanding, not rote recall
   - Wording is unambiguous

OUTPUT FORMAT (JSON):
{
  "status": "pass" or "fail",
  "feedback": ["Specific issue 1", "Specific issue 2"]
}

PASS if the content meets all criteria.
FAIL if any significant issue exists.

When failing, every feedback item must name the specific sentence or question
and the specific defect:
Good: "Sentence 2 uses 'photosynthesis' which is too complex for Grade 3"
Bad: "Language is too complex"

Good: "Question 3 tests memorization, not understanding"
Bad: "Questions need improvement"

Be thorough but fair. Minor issues do not warrant failure."#;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Reviewer backed by a text generation capability.
pub struct Reviewer {
    capability: Arc<dyn TextGenerationCapability>,
    temperature: f64,
}

impl Reviewer {
    /// Default sampling temperature.
    pub const DEFAULT_TEMPERATURE: f64 = 0.3;

    /// Create a reviewer.
    pub fn new(capability: Arc<dyn TextGenerationCapability>) -> Self {
        Self {
            capability,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Fixed system instructions describing the evaluation criteria.
    pub fn system_instructions() -> &'static str {
        SYSTEM_INSTRUCTIONS
    }

    /// Render the content under review.
    pub fn user_instructions(grade: Grade, topic: &str, content: &ContentSet) -> String {
        let questions: String = content
            .mcqs()
            .iter()
            .enumerate()
            .map(|(i, mcq)| {
                let options: String = OPTION_LABELS
                    .iter()
                    .zip(mcq.options())
                    .map(|(label, option)| format!("   {}) {}\n", label, option))
                    .collect();
                format!(
                    "\nQuestion {}: {}\n{}   Correct Answer: {}\n",
                    i + 1,
                    mcq.question(),
                    options,
                    mcq.answer()
                )
            })
            .collect();

        format!(
            "GRADE LEVEL: {}\n\
             TOPIC: {}\n\n\
             EXPLANATION:\n{}\n\n\
             MULTIPLE CHOICE QUESTIONS:\n{}\n\
             Please evaluate this content and provide your assessment.",
            grade,
            topic,
            content.explanation(),
            questions
        )
    }
}

#[async_trait]
impl ContentReviewer for Reviewer {
    async fn evaluate(
        &self,
        grade: Grade,
        topic: &str,
        content: &ContentSet,
    ) -> Result<ReviewVerdict, ReviewError> {
        let user = Self::user_instructions(grade, topic, content);

        debug!(grade = grade.value(), "Requesting review");

        let raw = self
            .capability
            .invoke(SYSTEM_INSTRUCTIONS, &user, self.temperature)
            .await?;

        ReviewVerdict::from_json(raw.clone()).map_err(|e| ReviewError::invalid(e, &raw))
    }
}
