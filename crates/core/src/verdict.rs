//! Review verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Outcome of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Content meets every criterion
    Pass,
    /// Content has issues worth a refinement
    Fail,
}

impl ReviewStatus {
    /// Parse the wire form (`pass` / `fail`).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pass" => Ok(ReviewStatus::Pass),
            "fail" => Ok(ReviewStatus::Fail),
            other => Err(ValidationError::new(
                "status",
                format!("expected 'pass' or 'fail', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Pass => write!(f, "pass"),
            ReviewStatus::Fail => write!(f, "fail"),
        }
    }
}

/// A reviewer's judgment plus the feedback behind it.
///
/// A failing verdict always carries at least one feedback item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVerdict")]
pub struct ReviewVerdict {
    status: ReviewStatus,
    feedback: Vec<String>,
}

impl ReviewVerdict {
    /// Create a validated verdict.
    pub fn new(status: ReviewStatus, feedback: Vec<String>) -> Result<Self, ValidationError> {
        if status == ReviewStatus::Fail && feedback.is_empty() {
            return Err(ValidationError::new(
                "feedback",
                "feedback is required when status is fail",
            ));
        }

        Ok(Self { status, feedback })
    }

    /// A passing verdict with no remarks.
    pub fn pass() -> Self {
        Self {
            status: ReviewStatus::Pass,
            feedback: Vec::new(),
        }
    }

    /// Validate untrusted JSON produced by the model.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let raw: RawVerdict =
            serde_json::from_value(value).map_err(|e| ValidationError::from_shape(&e))?;
        Self::try_from(raw)
    }

    /// Verdict status.
    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    /// Whether the content passed.
    pub fn passed(&self) -> bool {
        self.status == ReviewStatus::Pass
    }

    /// Feedback items, in the order the reviewer gave them.
    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }
}

/// Wire shape of a verdict before validation.
#[derive(Debug, Deserialize)]
#[serde(rename = "ReviewVerdict")]
struct RawVerdict {
    status: String,
    #[serde(default)]
    feedback: Vec<String>,
}

impl TryFrom<RawVerdict> for ReviewVerdict {
    type Error = ValidationError;

    fn try_from(raw: RawVerdict) -> Result<Self, Self::Error> {
        ReviewVerdict::new(ReviewStatus::parse(&raw.status)?, raw.feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fail_requires_feedback() {
        let err = ReviewVerdict::new(ReviewStatus::Fail, vec![]).unwrap_err();
        assert_eq!(err.field, "feedback");
    }

    #[test]
    fn test_pass_allows_empty_feedback() {
        let verdict = ReviewVerdict::new(ReviewStatus::Pass, vec![]).unwrap();
        assert!(verdict.passed());
        assert!(verdict.feedback().is_empty());
        assert_eq!(verdict, ReviewVerdict::pass());
    }

    #[test]
    fn test_from_json_defaults_missing_feedback() {
        let verdict = ReviewVerdict::from_json(json!({ "status": "pass" })).unwrap();
        assert_eq!(verdict.status(), ReviewStatus::Pass);
    }

    #[test]
    fn test_from_json_fail_without_feedback() {
        let err = ReviewVerdict::from_json(json!({ "status": "fail", "feedback": [] })).unwrap_err();
        assert_eq!(err.field, "feedback");
    }

    #[test]
    fn test_from_json_unknown_status() {
        let err = ReviewVerdict::from_json(json!({ "status": "maybe" })).unwrap_err();
        assert_eq!(err.field, "status");

        let err = ReviewVerdict::from_json(json!({ "status": "PASS" })).unwrap_err();
        assert_eq!(err.field, "status");
    }

    #[test]
    fn test_from_json_keeps_feedback_order() {
        let verdict = ReviewVerdict::from_json(json!({
            "status": "fail",
            "feedback": ["Question 3 tests memorization", "Sentence 2 is too long"]
        }))
        .unwrap();
        assert_eq!(
            verdict.feedback(),
            ["Question 3 tests memorization", "Sentence 2 is too long"]
        );
    }

    #[test]
    fn test_serializes_lowercase_status() {
        let value = serde_json::to_value(ReviewVerdict::pass()).unwrap();
        assert_eq!(value, json!({ "status": "pass", "feedback": [] }));
    }
}
