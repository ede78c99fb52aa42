//! The model gateway: one request/response contract over any LLM backend.

use crate::config::ModelSettings;
use crate::error::{DistillError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A single model invocation.
///
/// Constructed fresh per call by the pipeline and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Persona label asserted in the system prompt (e.g., "Senior SRE").
    pub role: String,
    /// Task description for this call; embeds role/context substitutions.
    pub instruction: String,
    /// The content to operate on.
    pub input_data: String,
    /// Determinism control in [0,1]; low for extraction/audit, higher for writing.
    pub temperature: f32,
}

/// Boundary abstracting any LLM backend behind a single call.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send one request and return the model's freeform text response.
    ///
    /// Transport failures and non-success statuses surface as
    /// [`DistillError::Model`]; a structurally empty response surfaces as
    /// [`DistillError::EmptyResponse`].
    async fn call(&self, request: &AgentRequest) -> Result<String>;
}

/// Gateway for OpenAI-compatible chat completion endpoints.
pub struct OpenAiGateway {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiGateway {
    /// Create a gateway from model settings.
    pub fn new(settings: &ModelSettings) -> Self {
        let client = create_client_with_timeout(
            settings.base_url.as_deref(),
            Duration::from_secs(settings.timeout_seconds),
        );

        Self {
            client,
            model: settings.model.clone(),
        }
    }

    /// Compose the system prompt asserting the persona.
    fn system_prompt(request: &AgentRequest) -> String {
        format!("Act as: {}. {}", request.role, request.instruction)
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn call(&self, request: &AgentRequest) -> Result<String> {
        debug!(role = %request.role, temperature = request.temperature, "Calling model");

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Self::system_prompt(request))
                .build()
                .map_err(|e| DistillError::Model(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.input_data.clone())
                .build()
                .map_err(|e| DistillError::Model(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(request.temperature)
            .build()
            .map_err(|e| DistillError::Model(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| DistillError::Model(format!("API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| {
                DistillError::EmptyResponse(format!("no choices for role '{}'", request.role))
            })?;

        if content.trim().is_empty() {
            return Err(DistillError::EmptyResponse(format!(
                "blank content for role '{}'",
                request.role
            )));
        }

        Ok(content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_asserts_persona() {
        let request = AgentRequest {
            role: "Executive Chef".to_string(),
            instruction: "Extract the recipe steps.".to_string(),
            input_data: "transcript".to_string(),
            temperature: 0.1,
        };

        let prompt = OpenAiGateway::system_prompt(&request);
        assert!(prompt.starts_with("Act as: Executive Chef."));
        assert!(prompt.contains("Extract the recipe steps."));
    }
}
