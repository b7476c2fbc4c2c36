//! Content generator agent.

use async_trait::async_trait;
use ekalavya_core::{ContentSet, GenerationRequest, Grade, MAX_MCQS, MIN_MCQS, OPTION_COUNT};
use ekalavya_llm::TextGenerationCapability;
use std::sync::Arc;
use tracing::debug;

use crate::agent::ContentGenerator;
use crate::error::GenerationError;

/// Vocabulary guidance for an inclusive range of grades.
#[derive(Debug, Clone, Copy)]
pub struct GradeBand {
    /// Lowest grade in the band
    pub min: u8,
    /// Highest grade in the band
    pub max: u8,
    /// Language guideline for the band
    pub guideline: &'static str,
}

const ADVANCED_GUIDELINE: &str = "Use advanced vocabulary. Complex sentences allowed. \
     Abstract reasoning and real-world applications.";

/// Grade bands, checked in order.
pub const GRADE_BANDS: &[GradeBand] = &[
    GradeBand {
        min: 1,
        max: 3,
        guideline: "Use very simple words (1-2 syllables). Short sentences (5-8 words). \
                    Concrete examples from daily life.",
    },
    GradeBand {
        min: 4,
        max: 6,
        guideline: "Use simple vocabulary. Clear sentences (8-12 words). \
                    Relatable examples from school and home.",
    },
    GradeBand {
        min: 7,
        max: 9,
        guideline: "Use grade-appropriate vocabulary. Moderate complexity (12-15 words). \
                    Abstract concepts with examples.",
    },
    GradeBand {
        min: 10,
        max: 12,
        guideline: ADVANCED_GUIDELINE,
    },
];

/// Guideline for a grade; grades outside every band get the most advanced one.
pub fn guideline_for(grade: u8) -> &'static str {
    GRADE_BANDS
        .iter()
        .find(|band| (band.min..=band.max).contains(&grade))
        .map(|band| band.guideline)
        .unwrap_or(ADVANCED_GUIDELINE)
}

/// Generator backed by a text generation capability.
pub struct Generator {
    capability: Arc<dyn TextGenerationCapability>,
    temperature: f64,
}

impl Generator {
    /// Default sampling temperature.
    pub const DEFAULT_TEMPERATURE: f64 = 0.7;

    /// Create a generator.
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

    /// System instructions for a grade.
    pub fn system_instructions(grade: Grade) -> String {
        let guideline = guideline_for(grade.value());

        format!(
            r#"You are an expert educational content creator for Grade {grade} students.

GRADE {grade} LANGUAGE GUIDELINES:
{guideline}

YOUR TASK:
1. Write a clear, age-appropriate explanation of the topic
2. Write {min}-{max} multiple choice questions that test understanding

OUTPUT FORMAT (JSON):
{{
  "explanation": "Clear explanation here...",
  "mcqs": [
    {{
      "question": "Question text?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "answer": "Option B"
    }}
  ]
}}

REQUIREMENTS:
- The explanation must be factually correct and suited to Grade {grade}
- Questions must test understanding, not just recall
- Every question has exactly {options} plausible options
- The answer must be exactly one of the options, copied verbatim
- Use vocabulary appropriate for Grade {grade}"#,
            grade = grade,
            guideline = guideline,
            min = MIN_MCQS,
            max = MAX_MCQS,
            options = OPTION_COUNT,
        )
    }

    /// User instructions for a request, framed as a revision when feedback is present.
    pub fn user_instructions(request: &GenerationRequest) -> String {
        match request.feedback() {
            Some(feedback) if !feedback.is_empty() => {
                let items = feedback
                    .iter()
                    .map(|item| format!("- {}", item))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "Topic: {}\n\n\
                     PREVIOUS ATTEMPT HAD ISSUES:\n{}\n\n\
                     Please create improved content that addresses every issue above.",
                    request.topic(),
                    items
                )
            }
            _ => format!(
                "Topic: {}\n\nPlease create educational content for this topic.",
                request.topic()
            ),
        }
    }
}

#[async_trait]
impl ContentGenerator for Generator {
    async fn generate(&self, request: &GenerationRequest) -> Result<ContentSet, GenerationError> {
        let system = Self::system_instructions(request.grade());
        let user = Self::user_instructions(request);

        debug!(
            grade = request.grade().value(),
            refinement = request.is_refinement(),
            "Requesting content"
        );

        let raw = self
            .capability
            .invoke(&system, &user, self.temperature)
            .await?;

        ContentSet::from_json(raw.clone()).map_err(|e| GenerationError::invalid(e, &raw))
    }
}
