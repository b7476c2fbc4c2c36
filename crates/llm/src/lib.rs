//! Text generation capability.
//!
//! The trait the agents call, plus an OpenAI-compatible implementation.

#![warn(missing_docs)]

pub mod capability;
pub mod config;
pub mod openai;

pub use capability::{CapabilityError, TextGenerationCapability};
pub use config::{ConfigError, LlmConfig};
pub use openai::{parse_json_content, OpenAiClient};
