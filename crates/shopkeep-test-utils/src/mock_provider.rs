// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text-generation provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` by replaying a FIFO script of
//! replies and recording every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use shopkeep_core::traits::adapter::PluginAdapter;
use shopkeep_core::traits::provider::ProviderAdapter;
use shopkeep_core::types::{
    AdapterType, HealthStatus, ProductIntent, ProviderRequest, ProviderResponse, TokenUsage,
    ToolCall,
};
use shopkeep_core::ShopError;

/// One scripted provider reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A final text answer.
    Text(String),
    /// A turn requesting the given tool calls.
    ToolCalls(Vec<ToolCall>),
    /// A provider failure with this message.
    Fail(String),
}

impl MockReply {
    /// A single tool call with generated id.
    pub fn tool(name: &str, arguments: serde_json::Value) -> Self {
        MockReply::ToolCalls(vec![ToolCall {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: name.to_string(),
            arguments,
        }])
    }

    /// A resolver answer encoding `intent` as JSON.
    pub fn intent(intent: &ProductIntent) -> Self {
        // ProductIntent only holds strings and a bool; serialization cannot fail.
        MockReply::Text(serde_json::to_string(intent).unwrap_or_default())
    }
}

/// A mock provider that replays scripted replies.
///
/// When the script runs out, a plain "mock response" text is returned.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    /// Create a mock provider with an empty script.
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a reply to the script.
    pub async fn push(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Script one complete chat turn: the agent's final reply followed by the
    /// resolver's structured answer.
    pub async fn script_turn(&self, agent_reply: &str, resolved: &ProductIntent) {
        let mut replies = self.replies.lock().await;
        replies.push_back(MockReply::Text(agent_reply.to_string()));
        replies.push_back(MockReply::intent(resolved));
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of `complete` calls made.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Replies still queued.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ShopError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| "mock-model".to_string());
        self.requests.lock().await.push(request);

        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text("mock response".to_string()));

        let (content, tool_calls, stop_reason) = match reply {
            MockReply::Text(text) => (Some(text), Vec::new(), "stop"),
            MockReply::ToolCalls(calls) => (None, calls, "tool_calls"),
            MockReply::Fail(message) => return Err(ShopError::provider(message)),
        };

        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content,
            tool_calls,
            model,
            stop_reason: Some(stop_reason.to_string()),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}
