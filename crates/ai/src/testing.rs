//! Scripted fakes shared by the agent and pipeline tests.

use async_trait::async_trait;
use ekalavya_core::{ContentSet, GenerationRequest, Grade, ReviewStatus, ReviewVerdict};
use ekalavya_llm::{CapabilityError, TextGenerationCapability};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::agent::{ContentGenerator, ContentReviewer};
use crate::error::{GenerationError, ReviewError};

/// One recorded capability invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub system: String,
    pub user: String,
    pub temperature: f64,
}

/// Capability that replays queued responses in order.
#[derive(Default)]
pub struct ScriptedCapability {
    responses: Mutex<VecDeque<Result<Value, CapabilityError>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedCapability {
    pub fn new(responses: Vec<Result<Value, CapabilityError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerationCapability for ScriptedCapability {
    async fn invoke(
        &self,
        system_instructions: &str,
        user_instructions: &str,
        temperature: f64,
    ) -> Result<Value, CapabilityError> {
        self.calls.lock().unwrap().push(Invocation {
            system: system_instructions.to_string(),
            user: user_instructions.to_string(),
            temperature,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CapabilityError::EmptyResponse))
    }
}

/// Generator output JSON with `count` questions; `tag` makes explanations distinct.
pub fn content_json(tag: &str, count: usize) -> Value {
    let mcqs: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "question": format!("Where does the water go in step {}?", i + 1),
                "options": ["Up into the sky", "Down a drain", "Into a rock", "Nowhere at all"],
                "answer": "Up into the sky"
            })
        })
        .collect();

    json!({
        "explanation": format!(
            "[{}] The sun warms water in seas and lakes. The water rises as vapor, \
             cools into clouds, and falls back down as rain.",
            tag
        ),
        "mcqs": mcqs,
    })
}

pub fn content(tag: &str) -> ContentSet {
    ContentSet::from_json(content_json(tag, 3)).unwrap()
}

pub fn fail_verdict(feedback: &[&str]) -> ReviewVerdict {
    ReviewVerdict::new(
        ReviewStatus::Fail,
        feedback.iter().map(|s| s.to_string()).collect(),
    )
    .unwrap()
}

pub fn transport_error() -> CapabilityError {
    CapabilityError::Transport {
        endpoint: "https://api.example.test/v1/chat/completions".to_string(),
        message: "connection reset by peer".to_string(),
    }
}

/// Generator that records every request and returns numbered content.
#[derive(Default)]
pub struct RecordingGenerator {
    requests: Mutex<Vec<GenerationRequest>>,
}

impl RecordingGenerator {
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<ContentSet, GenerationError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(content(&format!("attempt {}", requests.len())))
    }
}

/// Reviewer that always returns the same verdict.
pub struct FixedReviewer {
    verdict: ReviewVerdict,
    calls: Mutex<usize>,
}

impl FixedReviewer {
    pub fn new(verdict: ReviewVerdict) -> Self {
        Self {
            verdict,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ContentReviewer for FixedReviewer {
    async fn evaluate(
        &self,
        _grade: Grade,
        _topic: &str,
        _content: &ContentSet,
    ) -> Result<ReviewVerdict, ReviewError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.verdict.clone())
    }
}
