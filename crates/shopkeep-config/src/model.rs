// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Shopkeep catalog assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Shopkeep configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShopConfig {
    /// Chat agent behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Text-generation service settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Uploaded image storage settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// HTTP API settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Chat agent behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound on model round-trips the intent agent may spend on tool calls per turn.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Downgrade a resolved `is_add` to false unless the user's message itself
    /// contains a creation trigger phrase.
    #[serde(default = "default_enforce_trigger_gate")]
    pub enforce_trigger_gate: bool,

    /// Inline system prompt for the intent agent. Overridden by `system_prompt_file`.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the intent agent's system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            max_tool_rounds: default_max_tool_rounds(),
            enforce_trigger_gate: default_enforce_trigger_gate(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "shopkeep".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_tool_rounds() -> u32 {
    6
}

fn default_enforce_trigger_gate() -> bool {
    true
}

/// Text-generation service configuration (any OpenAI-compatible chat completions API).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. `None` falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat completions API, ending in `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for both the agent and the resolver.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient HTTP statuses (429, 500, 502, 503). Zero disables retrying.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai/".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    120
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("shopkeep").join("shopkeep.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "shopkeep.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Uploaded image storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Directory uploaded images are written under.
    #[serde(default = "default_media_root")]
    pub root_dir: String,

    /// URL path prefix images are served from.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,

    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root_dir: default_media_root(),
            public_prefix: default_public_prefix(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_media_root() -> String {
    dirs::data_dir()
        .map(|p| p.join("shopkeep").join("media"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "media".to_string())
}

fn default_public_prefix() -> String {
    "/media".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default number of turns returned by the history endpoint.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_history_limit() -> usize {
    10
}
