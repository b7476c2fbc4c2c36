//! Validation failures and error classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters of raw model output carried in error messages.
pub const SNIPPET_LIMIT: usize = 200;

/// A schema invariant was violated.
///
/// `field` is a path into the offending value, e.g. `mcqs[2].answer`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Path of the offending field
    pub field: String,

    /// Human-readable cause
    pub reason: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the field path with a parent path.
    pub fn within(self, parent: impl fmt::Display) -> Self {
        Self {
            field: format!("{}.{}", parent, self.field),
            reason: self.reason,
        }
    }

    /// Build from a serde error raised while reading a JSON shape.
    ///
    /// serde reports missing keys as "missing field `name`"; that key becomes
    /// the field path. Anything else is attributed to the whole response.
    pub fn from_shape(err: &serde_json::Error) -> Self {
        let message = err.to_string();
        let field = message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next())
            .unwrap_or("response");
        Self::new(field, message.clone())
    }
}

/// Classified kind of a failed run, reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-supplied grade/topic outside bounds
    Input,
    /// Well-formed JSON that violates a schema invariant
    Validation,
    /// Capability output that is not JSON at all
    MalformedResponse,
    /// The capability call itself failed
    Capability,
    /// A caller deadline elapsed before the run finished
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::MalformedResponse => write!(f, "malformed_response"),
            ErrorKind::Capability => write!(f, "capability"),
            ErrorKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// Truncate raw text to [`SNIPPET_LIMIT`] characters for diagnostics.
pub fn snippet(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(SNIPPET_LIMIT).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_prefixes_path() {
        let err = ValidationError::new("answer", "not among options").within("mcqs[1]");
        assert_eq!(err.field, "mcqs[1].answer");
        assert_eq!(err.to_string(), "mcqs[1].answer: not among options");
    }

    #[test]
    fn test_from_shape_extracts_missing_key() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Shape {
            explanation: String,
        }

        let err = serde_json::from_str::<Shape>("{}").unwrap_err();
        let validation = ValidationError::from_shape(&err);
        assert_eq!(validation.field, "explanation");
    }

    #[test]
    fn test_from_shape_defaults_to_response() {
        let err = serde_json::from_str::<Vec<String>>("{\"a\": 1}").unwrap_err();
        assert_eq!(ValidationError::from_shape(&err).field, "response");
    }

    #[test]
    fn test_snippet_truncates_long_text() {
        let long = "x".repeat(SNIPPET_LIMIT + 50);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), SNIPPET_LIMIT + 3);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn test_error_kind_display_matches_serde() {
        let json = serde_json::to_string(&ErrorKind::MalformedResponse).unwrap();
        assert_eq!(json, format!("\"{}\"", ErrorKind::MalformedResponse));
    }
}
