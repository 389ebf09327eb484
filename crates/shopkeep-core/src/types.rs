// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapters, the agent pipeline and the gateway.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Session label recorded when a turn carries no session identifier.
pub const ANONYMOUS_SESSION: &str = "anonymous";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    BlobStore,
}

// --- Product intent ---

/// The structured "intent to create a product" built during a single chat turn.
///
/// Text fields use the empty string for "not provided". `product_price` is the
/// raw token the user typed (for example `"25.50"`), not yet a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductIntent {
    pub product_id: Option<String>,
    pub product_name: String,
    pub product_price: String,
    pub product_description: String,
    pub product_image: String,
    /// True only when the user explicitly asked for a product to be created.
    pub is_add: bool,
}

impl ProductIntent {
    /// Trims every text field and collapses an empty or literal `"null"` id to `None`.
    ///
    /// Model output tends to emit `""` or `"null"` where the schema allows a missing id.
    pub fn normalized(mut self) -> Self {
        self.product_id = self
            .product_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && !id.eq_ignore_ascii_case("null"));
        self.product_name = self.product_name.trim().to_string();
        self.product_price = self.product_price.trim().to_string();
        self.product_description = self.product_description.trim().to_string();
        self.product_image = self.product_image.trim().to_string();
        self
    }

    /// Whether this intent is allowed to create or update a catalog entry.
    pub fn is_actionable(&self) -> bool {
        self.is_add && !self.product_name.is_empty() && !self.product_price.is_empty()
    }
}

/// Outcome of one chat turn, returned to the caller and recorded in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurnResult {
    pub success: bool,
    pub agent_message: String,
    pub is_add: bool,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    /// Normalized decimal string (two decimal places) when a price was resolved.
    pub product_price: Option<String>,
    pub product_description: Option<String>,
    /// True when the caller may now attach an image to `product_id`.
    pub trigger_upload: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatTurnResult {
    /// Apology returned to the user when the text-generation service fails.
    pub const APOLOGY: &'static str = "Sorry, I encountered an error.";

    /// Builds the uniform failure result for an upstream error.
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            agent_message: Self::APOLOGY.to_string(),
            is_add: false,
            product_id: None,
            product_name: None,
            product_price: None,
            product_description: None,
            trigger_upload: false,
            error: Some(detail.into()),
        }
    }
}

// --- Catalog ---

/// A persisted catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Internal row id.
    pub id: i64,
    /// External key, unique across the catalog.
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    /// Public URL of the attached image, if any.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or overwriting a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
}

/// An append-only record of one successful chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: i64,
    pub user_message: String,
    /// The serialized [`ChatTurnResult`] returned for this turn.
    pub agent_response: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

impl ConversationTurn {
    /// Parses the recorded response back into a [`ChatTurnResult`].
    pub fn result(&self) -> Result<ChatTurnResult, serde_json::Error> {
        serde_json::from_str(&self.agent_response)
    }
}

/// An uploaded image awaiting storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    /// Client-supplied file name, used only for its extension.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    /// Canonical file extension for the image format, sniffed from the leading
    /// bytes. `None` when the payload is not a PNG, JPEG, GIF or WebP image.
    pub fn image_extension(&self) -> Option<&'static str> {
        let b = self.bytes.as_slice();
        if b.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some("png")
        } else if b.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some("jpg")
        } else if b.starts_with(b"GIF87a") || b.starts_with(b"GIF89a") {
            Some("gif")
        } else if b.len() >= 12 && &b[0..4] == b"RIFF" && &b[8..12] == b"WEBP" {
            Some("webp")
        } else {
            None
        }
    }
}

/// Result of attaching an image to an existing product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachResult {
    pub success: bool,
    pub message: String,
    pub image_url: String,
    pub trigger_upload: bool,
    pub product_id: String,
    pub product_name: String,
    pub product_description: Option<String>,
    pub product_price: String,
}

// --- Provider types ---

/// Speaker role of a message in a provider conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments.
    pub arguments: serde_json::Value,
}

/// One message in a provider conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ProviderMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Assistant turn that requested tool calls (content may be absent).
    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Result of a tool call, addressed to the call that requested it.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

/// A function the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: serde_json::Value,
}

/// A JSON Schema the model's final answer must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// A request to the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// Model override; the provider's configured default is used when `None`.
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub messages: Vec<ProviderMessage>,
    pub tools: Vec<ToolDefinition>,
    pub response_schema: Option<ResponseSchema>,
    pub max_tokens: Option<u32>,
}

impl ProviderRequest {
    /// A plain request with a single user message.
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            model: None,
            system_prompt: None,
            messages: vec![ProviderMessage::user(user_message)],
            tools: Vec::new(),
            response_schema: None,
            max_tokens: None,
        }
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed response from the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub id: String,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_intent_drops_blank_ids() {
        let intent = ProductIntent {
            product_id: Some("  ".into()),
            product_name: " Lamp ".into(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(intent.product_id, None);
        assert_eq!(intent.product_name, "Lamp");

        let intent = ProductIntent {
            product_id: Some("null".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(intent.product_id, None);
    }

    #[test]
    fn actionable_requires_flag_name_and_price() {
        let mut intent = ProductIntent {
            product_name: "Lamp".into(),
            product_price: "25.50".into(),
            ..Default::default()
        };
        assert!(!intent.is_actionable());
        intent.is_add = true;
        assert!(intent.is_actionable());
        intent.product_price.clear();
        assert!(!intent.is_actionable());
    }

    #[test]
    fn intent_deserializes_with_missing_fields() {
        let intent: ProductIntent =
            serde_json::from_str(r#"{"product_name":"Lamp","is_add":true}"#).unwrap();
        assert_eq!(intent.product_name, "Lamp");
        assert!(intent.product_price.is_empty());
        assert!(intent.is_add);
    }

    #[test]
    fn failure_result_omits_nothing_but_carries_error() {
        let result = ChatTurnResult::failure("provider error: down");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["agent_message"], "Sorry, I encountered an error.");
        assert_eq!(json["error"], "provider error: down");
        assert!(json["product_id"].is_null());
    }

    #[test]
    fn success_result_skips_error_field() {
        let result = ChatTurnResult {
            success: true,
            agent_message: "hi".into(),
            is_add: false,
            product_id: None,
            product_name: None,
            product_price: None,
            product_description: None,
            trigger_upload: false,
            error: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn conversation_turn_parses_recorded_result() {
        let result = ChatTurnResult::failure("x");
        let turn = ConversationTurn {
            id: 1,
            user_message: "hello".into(),
            agent_response: serde_json::to_string(&result).unwrap(),
            timestamp: Utc::now(),
            session_id: ANONYMOUS_SESSION.into(),
        };
        assert_eq!(turn.result().unwrap(), result);
    }

    #[test]
    fn image_extension_sniffs_magic_bytes() {
        let blob = |bytes: &[u8]| ImageBlob {
            file_name: "upload.bin".into(),
            content_type: None,
            bytes: bytes.to_vec(),
        };
        assert_eq!(blob(b"\x89PNG\r\n\x1a\n....").image_extension(), Some("png"));
        assert_eq!(blob(&[0xFF, 0xD8, 0xFF, 0xE0]).image_extension(), Some("jpg"));
        assert_eq!(blob(b"GIF89a..").image_extension(), Some("gif"));
        assert_eq!(blob(b"RIFF\0\0\0\0WEBPVP8 ").image_extension(), Some("webp"));
        assert_eq!(blob(b"%PDF-1.7").image_extension(), None);
        assert_eq!(blob(b"").image_extension(), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::Tool.to_string(), "tool");
    }

    #[test]
    fn tool_result_message_targets_call() {
        let msg = ProviderMessage::tool_result("call_1", "done");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.content.as_deref(), Some("done"));
    }
}
