//! Generated content - explanations and multiple-choice questions.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{snippet, ValidationError};

/// Minimum question length, in characters.
pub const MIN_QUESTION_CHARS: usize = 10;

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Minimum explanation length, in characters.
pub const MIN_EXPLANATION_CHARS: usize = 50;

/// Fewest questions in a content set.
pub const MIN_MCQS: usize = 3;

/// Most questions in a content set.
pub const MAX_MCQS: usize = 5;

/// A multiple-choice question with four options.
///
/// The answer is always one of the options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMcq")]
pub struct Mcq {
    question: String,
    options: [String; OPTION_COUNT],
    answer: String,
}

impl Mcq {
    /// Create a validated question.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let question = question.into();
        let answer = answer.into();

        if char_len(&question) < MIN_QUESTION_CHARS {
            return Err(ValidationError::new(
                "question",
                format!(
                    "must be at least {} characters, got {}",
                    MIN_QUESTION_CHARS,
                    char_len(&question)
                ),
            ));
        }

        let options: [String; OPTION_COUNT] = options.try_into().map_err(|rest: Vec<String>| {
            ValidationError::new(
                "options",
                format!("expected exactly {} options, got {}", OPTION_COUNT, rest.len()),
            )
        })?;

        if !options.contains(&answer) {
            return Err(ValidationError::new(
                "answer",
                format!("'{}' is not one of the provided options", answer),
            ));
        }

        Ok(Self {
            question,
            options,
            answer,
        })
    }

    /// Question text.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The four options, in order.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The correct option.
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// An explanation plus 3-5 questions testing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContentSet")]
pub struct ContentSet {
    explanation: String,
    mcqs: Vec<Mcq>,
}

impl ContentSet {
    /// Create a validated content set.
    pub fn new(explanation: impl Into<String>, mcqs: Vec<Mcq>) -> Result<Self, ValidationError> {
        let explanation = explanation.into();

        if char_len(&explanation) < MIN_EXPLANATION_CHARS {
            return Err(ValidationError::new(
                "explanation",
                format!(
                    "must be at least {} characters, got {}",
                    MIN_EXPLANATION_CHARS,
                    char_len(&explanation)
                ),
            ));
        }

        if !(MIN_MCQS..=MAX_MCQS).contains(&mcqs.len()) {
            return Err(ValidationError::new(
                "mcqs",
                format!(
                    "expected {}-{} questions, got {}",
                    MIN_MCQS,
                    MAX_MCQS,
                    mcqs.len()
                ),
            ));
        }

        Ok(Self { explanation, mcqs })
    }

    /// Validate untrusted JSON produced by the model.
    ///
    /// Shape errors name the offending key, including its position inside
    /// `mcqs`.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ValidationError::new(
                    "response",
                    format!("expected a JSON object, got {}", snippet(&other.to_string())),
                ))
            }
        };

        Self::try_from(RawContentSet {
            explanation: take_field(&mut object, "explanation")?,
            mcqs: take_field(&mut object, "mcqs")?,
        })
    }

    /// The explanation text.
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// The questions, in order.
    pub fn mcqs(&self) -> &[Mcq] {
        &self.mcqs
    }
}

/// Wire shape of a question before validation.
#[derive(Debug, Deserialize)]
#[serde(rename = "Mcq")]
struct RawMcq {
    question: String,
    options: Vec<String>,
    answer: String,
}

impl RawMcq {
    fn from_object(mut object: Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            question: take_field(&mut object, "question")?,
            options: take_field(&mut object, "options")?,
            answer: take_field(&mut object, "answer")?,
        })
    }
}

impl TryFrom<RawMcq> for Mcq {
    type Error = ValidationError;

    fn try_from(raw: RawMcq) -> Result<Self, Self::Error> {
        Mcq::new(raw.question, raw.options, raw.answer)
    }
}

/// Wire shape of a content set before validation.
#[derive(Debug, Deserialize)]
#[serde(rename = "ContentSet")]
struct RawContentSet {
    explanation: String,
    mcqs: Vec<Value>,
}

impl TryFrom<RawContentSet> for ContentSet {
    type Error = ValidationError;

    fn try_from(raw: RawContentSet) -> Result<Self, Self::Error> {
        let mcqs = raw
            .mcqs
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let path = format!("mcqs[{}]", i);
                match value {
                    Value::Object(object) => RawMcq::from_object(object)
                        .and_then(Mcq::try_from)
                        .map_err(|e| e.within(&path)),
                    other => Err(ValidationError::new(
                        path,
                        format!("expected a JSON object, got {}", snippet(&other.to_string())),
                    )),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        ContentSet::new(raw.explanation, mcqs)
    }
}

/// Remove `key` from `object` and read it as `T`; errors name the key.
fn take_field<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    key: &str,
) -> Result<T, ValidationError> {
    let value = object
        .remove(key)
        .ok_or_else(|| ValidationError::new(key, format!("missing field `{}`", key)))?;
    serde_json::from_value(value).map_err(|e| ValidationError::new(key, e.to_string()))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
