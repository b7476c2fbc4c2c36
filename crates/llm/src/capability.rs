//! Text generation capability abstraction.

use async_trait::async_trait;
use ekalavya_core::ErrorKind;

/// Errors raised while invoking a text generation capability.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// The request never produced an HTTP response
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// Endpoint that was called
        endpoint: String,
        /// Underlying cause
        message: String,
    },

    /// Credentials were rejected
    #[error("model API rejected credentials (status {status})")]
    Auth {
        /// HTTP status
        status: u16,
    },

    /// The model API answered with a non-success status
    #[error("model API error (status {status}): {body}")]
    Api {
        /// HTTP status
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// The response carried no message content
    #[error("model response carried no content")]
    EmptyResponse,

    /// The content could not be parsed as JSON
    #[error("model returned invalid JSON: {reason}; content: {snippet}")]
    MalformedResponse {
        /// Parser error
        reason: String,
        /// Truncated raw content
        snippet: String,
    },
}

impl CapabilityError {
    /// Classified kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CapabilityError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            _ => ErrorKind::Capability,
        }
    }
}

/// An opaque generative text service returning structured JSON.
///
/// The returned value is untrusted and must be validated before use.
#[async_trait]
pub trait TextGenerationCapability: Send + Sync {
    /// Run one completion with the given instructions and sampling temperature.
    async fn invoke(
        &self,
        system_instructions: &str,
        user_instructions: &str,
        temperature: f64,
    ) -> Result<serde_json::Value, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_classified_separately() {
        let malformed = CapabilityError::MalformedResponse {
            reason: "expected value".to_string(),
            snippet: "hello".to_string(),
        };
        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);

        let transport = CapabilityError::Transport {
            endpoint: "http://localhost".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.kind(), ErrorKind::Capability);
        assert_eq!(CapabilityError::Auth { status: 401 }.kind(), ErrorKind::Capability);
    }
}
