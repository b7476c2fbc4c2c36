//! Generate → review → refine-once pipeline.
//!
//! A run moves through
//! `START → GENERATED → REVIEWED → {DONE | REFINING → REFINED → DONE}`.
//! A failing verdict triggers exactly one regeneration carrying the reviewer's
//! feedback; the regenerated content is returned without a second review.

use chrono::Utc;
use ekalavya_core::{GenerationRequest, PipelineResult, ReviewStatus, RunId};
use ekalavya_llm::TextGenerationCapability;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::agent::{AgentConfig, ContentGenerator, ContentReviewer};
use crate::error::{PipelineError, Stage};
use crate::generator::Generator;
use crate::reviewer::Reviewer;

/// States of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Input accepted, nothing generated yet
    Start,
    /// Initial content generated
    Generated,
    /// Verdict obtained
    Reviewed,
    /// Regenerating with feedback
    Refining,
    /// Refined content generated
    Refined,
    /// Result assembled
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Start => write!(f, "START"),
            PipelineState::Generated => write!(f, "GENERATED"),
            PipelineState::Reviewed => write!(f, "REVIEWED"),
            PipelineState::Refining => write!(f, "REFINING"),
            PipelineState::Refined => write!(f, "REFINED"),
            PipelineState::Done => write!(f, "DONE"),
        }
    }
}

/// Pipeline orchestrator.
///
/// Holds no per-run state; clones share the same agents.
#[derive(Clone)]
pub struct Pipeline {
    generator: Arc<dyn ContentGenerator>,
    reviewer: Arc<dyn ContentReviewer>,
}

impl Pipeline {
    /// Create a pipeline from two agents.
    pub fn new(generator: Arc<dyn ContentGenerator>, reviewer: Arc<dyn ContentReviewer>) -> Self {
        Self {
            generator,
            reviewer,
        }
    }

    /// Create a pipeline whose agents share one capability.
    pub fn from_capability(
        capability: Arc<dyn TextGenerationCapability>,
        config: &AgentConfig,
    ) -> Self {
        let generator =
            Generator::new(capability.clone()).with_temperature(config.generator_temperature);
        let reviewer = Reviewer::new(capability).with_temperature(config.reviewer_temperature);
        Self::new(Arc::new(generator), Arc::new(reviewer))
    }

    /// Run the pipeline once for a grade and topic.
    pub async fn run(&self, grade: i64, topic: &str) -> Result<PipelineResult, PipelineError> {
        let request = GenerationRequest::new(grade, topic).map_err(|e| {
            warn!("Rejected input: {}", e);
            PipelineError::Input(e)
        })?;

        let run_id = RunId::new();
        let span = info_span!(
            "pipeline",
            %run_id,
            grade = request.grade().value(),
            topic = request.topic()
        );

        self.execute(run_id, request).instrument(span).await
    }

    /// Run the pipeline, giving up on waiting once `deadline` elapses.
    ///
    /// The run is spawned as its own task; an in-flight capability call is
    /// left to finish in the background rather than being cancelled.
    pub async fn run_with_deadline(
        &self,
        grade: i64,
        topic: &str,
        deadline: Duration,
    ) -> Result<PipelineResult, PipelineError> {
        let pipeline = self.clone();
        let topic = topic.to_string();
        let handle = tokio::spawn(async move { pipeline.run(grade, &topic).await });

        match tokio::time::timeout(deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) if join_err.is_panic() => {
                std::panic::resume_unwind(join_err.into_panic())
            }
            Ok(Err(_)) => Err(PipelineError::Abandoned),
            Err(_) => {
                warn!("Run exceeded deadline of {:?}, no longer waiting", deadline);
                Err(PipelineError::Timeout(deadline))
            }
        }
    }

    async fn execute(
        &self,
        run_id: RunId,
        request: GenerationRequest,
    ) -> Result<PipelineResult, PipelineError> {
        info!("Creating content");
        enter(PipelineState::Start);

        let initial_content = self
            .generator
            .generate(&request)
            .await
            .map_err(|source| PipelineError::Generation {
                stage: Stage::Initial,
                source,
            })?;
        enter(PipelineState::Generated);

        let verdict = self
            .reviewer
            .evaluate(request.grade(), request.topic(), &initial_content)
            .await?;
        enter(PipelineState::Reviewed);

        let (final_content, refined) = match verdict.status() {
            ReviewStatus::Pass => {
                info!("Content passed review");
                (initial_content.clone(), false)
            }
            ReviewStatus::Fail => {
                warn!(
                    feedback_items = verdict.feedback().len(),
                    "Content failed review, refining"
                );
                enter(PipelineState::Refining);

                let retry = request.refinement(verdict.feedback().to_vec());
                let refined_content = self.generator.generate(&retry).await.map_err(|source| {
                    PipelineError::Generation {
                        stage: Stage::Refinement,
                        source,
                    }
                })?;
                enter(PipelineState::Refined);
                info!("Refinement complete");

                (refined_content, true)
            }
        };

        enter(PipelineState::Done);

        Ok(PipelineResult {
            run_id,
            initial_content,
            verdict,
            final_content,
            refined,
            completed_at: Utc::now(),
        })
    }
}

fn enter(state: PipelineState) {
    debug!(%state, "Pipeline state");
}
