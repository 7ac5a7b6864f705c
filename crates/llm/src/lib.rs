//! Completion service abstraction for Medlink
//!
//! The AI responder treats text completion as an opaque service: an ordered
//! list of role-tagged message parts plus an optional system instruction go
//! in, one final accumulated text comes out. `AnthropicService` is the
//! production implementation; `MockLlmService` backs tests.

pub mod anthropic;
pub mod mock;

pub use anthropic::AnthropicService;
pub use mock::MockLlmService;

use serde::{Deserialize, Serialize};

/// Role of a single message part in a completion exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
    Assistant,
}

/// One role-tagged message part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

/// Request for a text completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model to use; empty string selects the service default
    pub model: String,
    /// Optional system instruction
    pub system_prompt: Option<String>,
    /// Ordered message parts
    pub messages: Vec<LlmMessage>,
    /// Optional max output tokens; None selects the service default
    pub max_tokens: Option<u32>,
}

/// Response from a text completion
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Accumulated output text
    pub content: String,
    /// Model that produced the response
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// Completion service errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    Response(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Completion service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| LlmError::Config("ANTHROPIC_API_KEY is required".to_string()))?,
            default_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5-20250929".to_string()),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            base_url: std::env::var("LLM_BASE_URL").ok(),
        })
    }
}

/// Text completion service contract
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Run a completion request to completion, returning the final text
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// The model used when the request doesn't name one
    fn default_model(&self) -> &str;
}

/// Factory selecting a completion service implementation by provider name
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create a service for the given provider (`"anthropic"` or `"mock"`)
    pub fn create(provider: &str, config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match provider {
            "anthropic" => Ok(Box::new(AnthropicService::new(config))),
            "mock" => Ok(Box::new(MockLlmService::new())),
            other => Err(LlmError::Config(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}
