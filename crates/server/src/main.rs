//! Ekalavya - grade-appropriate explanations and quizzes
//!
//! Serves the generate/review/refine pipeline over HTTP, or runs it once
//! from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ekalavya_ai::{AgentConfig, Pipeline};
use ekalavya_llm::config::{API_KEY_VAR, BASE_URL_VAR, MODEL_VAR};
use ekalavya_llm::{LlmConfig, OpenAiClient};
use ekalavya_server::{build_router, AppState, GenerateResponse, ServiceConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ekalavya")]
#[command(about = "Ekalavya - reviewed educational content for grades 1-12", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key for the chat completions endpoint [env: OPENAI_API_KEY]
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model name [env: OPENAI_MODEL, default: gpt-4o-mini]
    #[arg(long, global = true)]
    model: Option<String>,

    /// API base URL [env: OPENAI_BASE_URL, default: https://api.openai.com/v1]
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "EKALAVYA_LISTEN", default_value = "127.0.0.1:5000")]
        listen: SocketAddr,

        /// Seconds a request waits for its pipeline run
        #[arg(long, env = "EKALAVYA_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
        request_timeout_secs: u64,
    },

    /// Run the pipeline once and print the result as JSON
    Generate {
        /// Grade level (1-12)
        #[arg(long, allow_hyphen_values = true)]
        grade: i64,

        /// Topic to teach
        #[arg(long)]
        topic: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print configuration and check the model endpoint
    Info,
}

fn init_logging() {
    // stdout carries command output; logs always go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ekalavya=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    /// Value given on the command line for a model variable.
    fn flag(&self, key: &str) -> Option<String> {
        match key {
            API_KEY_VAR => self.api_key.clone(),
            MODEL_VAR => self.model.clone(),
            BASE_URL_VAR => self.base_url.clone(),
            _ => None,
        }
    }

    /// Flags first, then the process environment.
    fn lookup(&self, key: &str) -> Option<String> {
        self.flag(key).or_else(|| std::env::var(key).ok())
    }

    fn client(&self) -> Result<OpenAiClient> {
        let config = LlmConfig::from_lookup(|key| self.lookup(key))?;
        Ok(OpenAiClient::new(config))
    }
}

fn build_pipeline(client: OpenAiClient) -> Pipeline {
    Pipeline::from_capability(Arc::new(client), &AgentConfig::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match &cli.command {
        Commands::Serve {
            listen,
            request_timeout_secs,
        } => {
            let config = ServiceConfig {
                listen: *listen,
                request_timeout: Duration::from_secs(*request_timeout_secs),
            };
            let client = cli.client()?;
            let model = client.model().to_string();
            let app = build_router(AppState::new(build_pipeline(client), &config));

            let listener = tokio::net::TcpListener::bind(config.listen)
                .await
                .with_context(|| format!("failed to bind {}", config.listen))?;
            info!(
                listen = %config.listen,
                model = %model,
                "Ekalavya service listening"
            );

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Shutting down");
                })
                .await?;
        }
        Commands::Generate {
            grade,
            topic,
            pretty,
        } => {
            let pipeline = build_pipeline(cli.client()?);
            let result = pipeline
                .run(*grade, topic)
                .await
                .map_err(|e| anyhow::anyhow!("{} error: {}", e.kind(), e))?;

            let response = GenerateResponse::from(result);
            let json = if *pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{}", json);
        }
        Commands::Info => {
            let config = LlmConfig::default().with_lookup(|key| cli.lookup(key));
            let has_key = config.validate().is_ok();
            let endpoint = config.completions_url();
            let client = OpenAiClient::new(config);

            println!("Ekalavya v{}", env!("CARGO_PKG_VERSION"));
            println!("  Model:    {}", client.model());
            println!("  Endpoint: {}", endpoint);
            println!("  API key:  {}", if has_key { "set" } else { "missing" });

            if has_key {
                let reachable = client.health_check().await;
                println!(
                    "  Status:   {}",
                    if reachable { "reachable" } else { "unreachable" }
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_lookup() {
        let cli = Cli::try_parse_from([
            "ekalavya",
            "--model",
            "gpt-4o",
            "--base-url",
            "http://localhost:8080/v1",
            "info",
        ])
        .unwrap();

        assert_eq!(cli.flag(MODEL_VAR).as_deref(), Some("gpt-4o"));
        assert_eq!(cli.flag(API_KEY_VAR), None);

        let config = LlmConfig::default().with_lookup(|key| cli.flag(key));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let cli = Cli::try_parse_from(["ekalavya", "info"]).unwrap();
        let result = LlmConfig::from_lookup(|key| cli.flag(key));
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_accepts_out_of_range_grade() {
        let cli = Cli::try_parse_from([
            "ekalavya", "generate", "--grade", "-1", "--topic", "Magnets",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Generate { grade: -1, .. }));
    }
}
