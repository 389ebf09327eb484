// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System instructions for the intent agent and the output resolver.

use shopkeep_config::model::AgentConfig;
use tracing::{info, warn};

/// Default intent-agent instructions. `{name}` is replaced with the agent name.
const DEFAULT_INSTRUCTIONS: &str = "\
You are {name}, a product catalog assistant. You only prepare products when \
the user explicitly asks you to add or create one.

Rules:
1. Never create or prepare a product on your own initiative.
2. Call extract_product_info only when the user says \"add product\", \
\"create product\", \"new product\" or \"make product\".
3. When details are missing, call get_missing_info and ask for them politely.
4. Call confirm_product_creation before telling the user a product is ready.
5. Do not guess what the user wants.

If the user is only asking questions or chatting, answer helpfully and do not \
try to create a product.";

/// Instructions for the structured-output pass.
pub const RESOLVER_INSTRUCTIONS: &str = "\
Extract the product information from the conversation context. \
Only set is_add to true if the user explicitly requested product creation. \
Leave fields empty when the conversation does not state them.";

/// Loads the intent-agent system prompt following priority: file > inline > default.
pub async fn load_system_prompt(config: &AgentConfig) -> String {
    if let Some(file_path) = &config.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = file_path, "loaded system prompt from file");
                    return trimmed.to_string();
                }
            }
            Err(e) => {
                warn!(
                    path = file_path,
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = config.system_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
        return prompt.to_string();
    }

    DEFAULT_INSTRUCTIONS.replace("{name}", &config.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_prompt_names_the_agent_and_triggers() {
        let prompt = load_system_prompt(&AgentConfig::default()).await;
        assert!(prompt.starts_with("You are shopkeep,"));
        assert!(prompt.contains("\"add product\""));
        assert!(prompt.contains("confirm_product_creation"));
    }

    #[tokio::test]
    async fn inline_prompt_overrides_default() {
        let config = AgentConfig {
            system_prompt: Some("Custom prompt.".into()),
            ..AgentConfig::default()
        };
        assert_eq!(load_system_prompt(&config).await, "Custom prompt.");
    }

    #[tokio::test]
    async fn file_prompt_wins_over_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "  From file.\n").unwrap();
        let config = AgentConfig {
            system_prompt: Some("Inline.".into()),
            system_prompt_file: Some(path.to_string_lossy().into_owned()),
            ..AgentConfig::default()
        };
        assert_eq!(load_system_prompt(&config).await, "From file.");
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_inline() {
        let config = AgentConfig {
            system_prompt: Some("Inline.".into()),
            system_prompt_file: Some("/nonexistent/shopkeep/prompt.md".into()),
            ..AgentConfig::default()
        };
        assert_eq!(load_system_prompt(&config).await, "Inline.");
    }
}
