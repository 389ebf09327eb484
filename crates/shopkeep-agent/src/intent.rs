// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The intent agent: a bounded tool-calling conversation with the model.

use std::sync::Arc;

use shopkeep_core::error::ShopError;
use shopkeep_core::traits::ProviderAdapter;
use shopkeep_core::types::{ProductIntent, ProviderMessage, ProviderRequest};
use shopkeep_skill::{SharedIntent, product_tools};
use tracing::debug;

/// What the intent agent produced for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentOutcome {
    /// Free-text reply shown to the user.
    pub reply: String,
    /// Fields the tools collected into the shared intent during the turn.
    pub collected: ProductIntent,
    /// Number of tool rounds spent before the final reply.
    pub tool_rounds: u32,
}

/// Runs the conversational policy over the three product tools.
///
/// Each call to [`IntentAgent::run`] starts from a fresh [`ProductIntent`];
/// nothing carries over between turns. Provider failures propagate as-is and
/// are never retried here.
pub struct IntentAgent {
    provider: Arc<dyn ProviderAdapter>,
    system_prompt: String,
    max_tool_rounds: u32,
}

impl IntentAgent {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        system_prompt: String,
        max_tool_rounds: u32,
    ) -> Self {
        Self {
            provider,
            system_prompt,
            max_tool_rounds,
        }
    }

    /// Sends `user_message` to the model and services its tool calls until it
    /// answers in text. Exceeding `max_tool_rounds` is a provider error.
    pub async fn run(&self, user_message: &str) -> Result<IntentOutcome, ShopError> {
        let intent = SharedIntent::default();
        let tools = product_tools(&intent);

        let mut request = ProviderRequest::new(user_message);
        request.system_prompt = Some(self.system_prompt.clone());
        request.tools = tools.tool_definitions();

        for round in 0..=self.max_tool_rounds {
            let response = self.provider.complete(request.clone()).await?;

            if response.tool_calls.is_empty() {
                let reply = response.content.unwrap_or_default().trim().to_string();
                let collected = intent.lock().await.clone();
                debug!(
                    tool_rounds = round,
                    is_add = collected.is_add,
                    "intent agent finished"
                );
                return Ok(IntentOutcome {
                    reply,
                    collected,
                    tool_rounds: round,
                });
            }

            if round == self.max_tool_rounds {
                break;
            }

            let calls = response.tool_calls;
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                debug!(tool = call.name.as_str(), round, "dispatching tool call");
                let output = tools.dispatch(&call.name, call.arguments.clone()).await;
                results.push(ProviderMessage::tool_result(&call.id, output.content));
            }
            request
                .messages
                .push(ProviderMessage::assistant(response.content, calls));
            request.messages.extend(results);
        }

        Err(ShopError::provider(format!(
            "intent agent exceeded {} tool rounds without a reply",
            self.max_tool_rounds
        )))
    }
}
