//! OpenAI client configuration with sensible defaults.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for model API requests (10 minutes).
///
/// Local models behind OpenAI-compatible endpoints can take a long time per
/// call, so the bound is generous but still finite.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Create an OpenAI-compatible client with configured timeout.
///
/// When `api_base` is given, requests go to that endpoint instead of the
/// hosted OpenAI API (LM Studio, Ollama, vLLM, and similar all expose the
/// same `/v1/chat/completions` contract).
pub fn create_client(api_base: Option<&str>) -> Client<OpenAIConfig> {
    create_client_with_timeout(api_base, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI-compatible client with a custom timeout.
pub fn create_client_with_timeout(
    api_base: Option<&str>,
    timeout: Duration,
) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    Client::with_config(config).with_http_client(http_client)
}
