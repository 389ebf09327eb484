// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured output resolution: the second model pass of a chat turn.
//!
//! The resolver sees the user's message and the intent agent's reply and
//! must answer with a JSON [`ProductIntent`]. Its answer is the only input
//! the orchestrator acts on.

use std::sync::Arc;

use shopkeep_core::error::ShopError;
use shopkeep_core::traits::ProviderAdapter;
use shopkeep_core::types::{ProductIntent, ProviderRequest, ResponseSchema};
use shopkeep_skill::has_trigger;
use tracing::{debug, warn};

use crate::prompt::RESOLVER_INSTRUCTIONS;

/// Name of the response schema sent to the provider.
pub const INTENT_SCHEMA_NAME: &str = "product_information";

/// Reduces a message and reply to one typed [`ProductIntent`].
pub struct OutputResolver {
    provider: Arc<dyn ProviderAdapter>,
    enforce_trigger_gate: bool,
}

impl OutputResolver {
    /// `enforce_trigger_gate` downgrades `is_add` to false whenever the user's
    /// own message carries no creation trigger phrase, whatever the model said.
    pub fn new(provider: Arc<dyn ProviderAdapter>, enforce_trigger_gate: bool) -> Self {
        Self {
            provider,
            enforce_trigger_gate,
        }
    }

    pub async fn resolve(
        &self,
        user_message: &str,
        agent_reply: &str,
    ) -> Result<ProductIntent, ShopError> {
        let mut request = ProviderRequest::new(resolver_input(user_message, agent_reply));
        request.system_prompt = Some(RESOLVER_INSTRUCTIONS.to_string());
        request.response_schema = Some(intent_schema());

        let response = self.provider.complete(request).await?;
        let raw = response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ShopError::provider("resolver returned no output"))?;

        let mut intent = parse_intent(&raw)?;

        if self.enforce_trigger_gate && intent.is_add && !has_trigger(user_message) {
            warn!(
                product_name = intent.product_name.as_str(),
                "resolver set is_add without a trigger phrase in the message, downgrading"
            );
            intent.is_add = false;
        }

        debug!(
            is_add = intent.is_add,
            has_id = intent.product_id.is_some(),
            "resolved product intent"
        );
        Ok(intent)
    }
}

/// The single user message given to the resolver.
pub fn resolver_input(user_message: &str, agent_reply: &str) -> String {
    format!("User said: {user_message}\nAgent response: {agent_reply}")
}

/// JSON Schema the resolver's answer must satisfy.
pub fn intent_schema() -> ResponseSchema {
    ResponseSchema {
        name: INTENT_SCHEMA_NAME.to_string(),
        schema: serde_json::json!({
            "type": "object",
            "properties": {
                "product_id": { "type": "string" },
                "product_name": { "type": "string" },
                "product_price": { "type": "string" },
                "product_description": { "type": "string" },
                "product_image": { "type": "string" },
                "is_add": { "type": "boolean" }
            },
            "required": [
                "product_id",
                "product_name",
                "product_price",
                "product_description",
                "product_image",
                "is_add"
            ],
            "additionalProperties": false
        }),
    }
}

/// Parses model output into a normalized intent.
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence. `null`
/// values are treated as absent fields.
fn parse_intent(raw: &str) -> Result<ProductIntent, ShopError> {
    let body = strip_code_fence(raw);
    let mut value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ShopError::Provider {
            message: format!("resolver output is not valid JSON: {e}"),
            source: Some(Box::new(e)),
        })?;

    let Some(fields) = value.as_object_mut() else {
        return Err(ShopError::provider("resolver output is not a JSON object"));
    };
    fields.retain(|_, v| !v.is_null());

    let intent: ProductIntent = serde_json::from_value(value).map_err(|e| ShopError::Provider {
        message: format!("resolver output does not match the intent schema: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(intent.normalized())
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
