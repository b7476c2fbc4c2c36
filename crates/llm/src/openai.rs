//! OpenAI-compatible chat completions client.
//!
//! Requests JSON-object output and parses the message content into a
//! `serde_json::Value`. Works against any server speaking the
//! `/chat/completions` protocol.

use async_trait::async_trait;
use ekalavya_core::snippet;
use regex::Regex;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::json;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::capability::{CapabilityError, TextGenerationCapability};
use crate::config::LlmConfig;

/// Chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    /// HTTP client
    client: Client,

    /// Connection settings
    config: LlmConfig,
}

impl OpenAiClient {
    /// Create a new client.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Model name in use.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Check that the API is reachable with the configured key.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/models", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl TextGenerationCapability for OpenAiClient {
    async fn invoke(
        &self,
        system_instructions: &str,
        user_instructions: &str,
        temperature: f64,
    ) -> Result<serde_json::Value, CapabilityError> {
        let endpoint = self.config.completions_url();
        let payload = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_instructions },
                { "role": "user", "content": user_instructions },
            ],
            "temperature": temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": { "type": "json_object" },
        });

        debug!(model = %self.config.model, temperature, "Calling chat completions API");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CapabilityError::Transport {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CapabilityError::Auth {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Chat completions API error (status {})", status);
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                body: snippet(&error_text),
            });
        }

        #[derive(serde::Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(serde::Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(serde::Deserialize)]
        struct Message {
            content: Option<String>,
        }

        let response_data: Response =
            response.json().await.map_err(|e| CapabilityError::Api {
                status: status.as_u16(),
                body: format!("unreadable response envelope: {}", e),
            })?;

        let content = response_data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CapabilityError::EmptyResponse)?;

        parse_json_content(&content)
    }
}

/// Parse model output as JSON, tolerating one surrounding Markdown code fence.
pub fn parse_json_content(content: &str) -> Result<serde_json::Value, CapabilityError> {
    let body = strip_code_fence(content);
    serde_json::from_str(body).map_err(|e| CapabilityError::MalformedResponse {
        reason: e.to_string(),
        snippet: snippet(content),
    })
}

fn strip_code_fence(content: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();

    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").ok());

    fence
        .as_ref()
        .and_then(|re| re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
        .unwrap_or(content)
}
