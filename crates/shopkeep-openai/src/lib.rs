// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat completions provider for Shopkeep.
//!
//! Talks to any endpoint speaking the chat completions dialect. The default
//! configuration targets Gemini's compatibility layer.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use shopkeep_config::model::ProviderConfig;
use shopkeep_core::error::ShopError;
use shopkeep_core::traits::{PluginAdapter, ProviderAdapter};
use shopkeep_core::types::{
    AdapterType, HealthStatus, ProviderMessage, ProviderRequest, ProviderResponse, TokenUsage,
    ToolCall,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ChatTool, FunctionSpec, JsonSchemaFormat,
    ResponseFormat, WireFunctionCall, WireToolCall,
};

/// Environment variable consulted when `provider.api_key` is unset.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Chat completions provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct OpenAiProvider {
    client: OpenAiClient,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Creates a provider from the `[provider]` config section.
    pub fn new(config: &ProviderConfig) -> Result<Self, ShopError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())?;
        let client = OpenAiClient::new(
            &api_key,
            &config.base_url,
            config.default_model.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;

        info!(
            model = config.default_model,
            base_url = config.base_url,
            "chat completions provider initialized"
        );

        Ok(Self {
            client,
            max_tokens: config.max_tokens,
        })
    }

    #[cfg(test)]
    fn with_client(client: OpenAiClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    /// Converts a [`ProviderRequest`] into the wire request.
    fn to_chat_request(&self, request: &ProviderRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_prompt.as_ref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage {
                role: "system".into(),
                content: Some(system.clone()),
                tool_calls: Vec::new(),
                tool_call_id: None,
            });
        }
        messages.extend(request.messages.iter().map(to_wire_message));

        let tools = request
            .tools
            .iter()
            .map(|t| ChatTool {
                kind: "function",
                function: FunctionSpec {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect();

        let response_format = request.response_schema.as_ref().map(|s| ResponseFormat {
            kind: "json_schema",
            json_schema: JsonSchemaFormat {
                name: s.name.clone(),
                schema: s.schema.clone(),
            },
        });

        ChatRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.client.default_model().to_string()),
            messages,
            tools,
            response_format,
            max_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        // Health stays local so polling never spends provider quota.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        debug!("chat completions provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ShopError> {
        let wire = self.to_chat_request(&request);
        let response = self.client.complete(&wire).await?;
        from_chat_response(response)
    }
}

fn resolve_api_key(config_key: Option<&str>, env_key: Option<String>) -> Result<String, ShopError> {
    if let Some(key) = config_key.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    env_key.filter(|k| !k.is_empty()).ok_or_else(|| {
        ShopError::Config(format!(
            "API key not found. Set provider.api_key in config or the {API_KEY_ENV} environment variable."
        ))
    })
}

fn to_wire_message(message: &ProviderMessage) -> ChatMessage {
    ChatMessage {
        role: message.role.to_string(),
        content: message.content.clone(),
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                kind: "function".into(),
                function: WireFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn from_chat_response(response: ChatResponse) -> Result<ProviderResponse, ShopError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ShopError::provider("API response contained no choices"))?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .enumerate()
        .map(|(i, call)| parse_tool_call(i, call))
        .collect::<Result<Vec<_>, _>>()?;

    let usage = response.usage.unwrap_or_default();
    Ok(ProviderResponse {
        id: response.id,
        content: choice.message.content,
        tool_calls,
        model: response.model,
        stop_reason: choice.finish_reason,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

/// Decodes the JSON-string arguments of a tool call. Some backends omit the
/// call id, so one is synthesized from the position.
fn parse_tool_call(index: usize, call: WireToolCall) -> Result<ToolCall, ShopError> {
    let raw = call.function.arguments.trim();
    let arguments = if raw.is_empty() {
        serde_json::Value::Object(Default::default())
    } else {
        serde_json::from_str(raw).map_err(|e| ShopError::Provider {
            message: format!(
                "malformed arguments for tool call {}: {e}",
                call.function.name
            ),
            source: Some(Box::new(e)),
        })?
    };
    let id = if call.id.is_empty() {
        format!("call_{index}")
    } else {
        call.id
    };
    Ok(ToolCall {
        id,
        name: call.function.name,
        arguments,
    })
}
