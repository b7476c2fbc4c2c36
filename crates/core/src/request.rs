//! Generation requests.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Lowest supported grade.
pub const MIN_GRADE: u8 = 1;

/// Highest supported grade.
pub const MAX_GRADE: u8 = 12;

/// Minimum topic length, in characters.
pub const MIN_TOPIC_CHARS: usize = 3;

/// A school grade between 1 and 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Grade(u8);

impl Grade {
    /// Create a validated grade.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(MIN_GRADE)..=i64::from(MAX_GRADE)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::new(
                "grade",
                format!("must be between {} and {}, got {}", MIN_GRADE, MAX_GRADE, value),
            ))
        }
    }

    /// Numeric value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Grade {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Grade::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Input to a single generation call.
///
/// `feedback` is only populated on the refinement retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    grade: Grade,
    topic: String,
    feedback: Option<Vec<String>>,
}

impl GenerationRequest {
    /// Create a validated first-attempt request.
    pub fn new(grade: i64, topic: impl Into<String>) -> Result<Self, ValidationError> {
        let grade = Grade::new(grade)?;
        let topic = topic.into();

        if topic.chars().count() < MIN_TOPIC_CHARS {
            return Err(ValidationError::new(
                "topic",
                format!("must be at least {} characters", MIN_TOPIC_CHARS),
            ));
        }

        Ok(Self {
            grade,
            topic,
            feedback: None,
        })
    }

    /// A new request for the same grade and topic carrying reviewer feedback.
    pub fn refinement(&self, feedback: Vec<String>) -> Self {
        Self {
            grade: self.grade,
            topic: self.topic.clone(),
            feedback: Some(feedback),
        }
    }

    /// Target grade.
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Topic text.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Feedback to address, if this is a refinement.
    pub fn feedback(&self) -> Option<&[String]> {
        self.feedback.as_deref()
    }

    /// Whether this request asks for a revision.
    pub fn is_refinement(&self) -> bool {
        self.feedback.as_ref().is_some_and(|items| !items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bounds() {
        assert!(Grade::new(0).is_err());
        assert!(Grade::new(13).is_err());
        assert!(Grade::new(-4).is_err());
        for g in 1..=12 {
            assert_eq!(Grade::new(g).unwrap().value() as i64, g);
        }
    }

    #[test]
    fn test_grade_deserialize_validates() {
        assert!(serde_json::from_str::<Grade>("7").is_ok());
        assert!(serde_json::from_str::<Grade>("42").is_err());
        assert_eq!(serde_json::to_string(&Grade::new(3).unwrap()).unwrap(), "3");
    }

    #[test]
    fn test_topic_min_length() {
        let err = GenerationRequest::new(5, "AI").unwrap_err();
        assert_eq!(err.field, "topic");
        assert!(GenerationRequest::new(5, "Air").is_ok());
    }

    #[test]
    fn test_invalid_grade_reported_first() {
        let err = GenerationRequest::new(0, "").unwrap_err();
        assert_eq!(err.field, "grade");
    }

    #[test]
    fn test_new_request_has_no_feedback() {
        let request = GenerationRequest::new(5, "Water Cycle").unwrap();
        assert!(request.feedback().is_none());
        assert!(!request.is_refinement());
    }

    #[test]
    fn test_refinement_keeps_grade_and_topic() {
        let request = GenerationRequest::new(2, "Photosynthesis").unwrap();
        let feedback = vec!["Sentence 1 is too complex".to_string()];
        let retry = request.refinement(feedback.clone());

        assert_eq!(retry.grade(), request.grade());
        assert_eq!(retry.topic(), "Photosynthesis");
        assert_eq!(retry.feedback(), Some(feedback.as_slice()));
        assert!(retry.is_refinement());
        // The source request is untouched.
        assert!(request.feedback().is_none());
    }
}
