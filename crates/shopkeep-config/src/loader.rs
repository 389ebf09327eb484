// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./shopkeep.toml` > `~/.config/shopkeep/shopkeep.toml` >
//! `/etc/shopkeep/shopkeep.toml` with environment variable overrides via `SHOPKEEP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ShopConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG: &str = "/etc/shopkeep/shopkeep.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "shopkeep.toml";

/// Sections that `SHOPKEEP_*` env var keys are split on.
const ENV_SECTIONS: &[&str] = &["agent", "provider", "storage", "media", "gateway"];

/// Per-user config file under the XDG config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shopkeep/shopkeep.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/shopkeep/shopkeep.toml` (system-wide)
/// 3. `~/.config/shopkeep/shopkeep.toml` (user XDG config)
/// 4. `./shopkeep.toml` (local directory)
/// 5. `SHOPKEEP_*` environment variables
pub fn load_config() -> Result<ShopConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ShopConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShopConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ShopConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ShopConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ShopConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Maps a prefix-stripped, lowercased env key onto a dotted config path.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `provider_api_key` maps to `provider.api_key` rather than `provider.api.key`.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section) {
            if let Some(field) = rest.strip_prefix('_') {
                return format!("{section}.{field}");
            }
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("SHOPKEEP_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("provider_api_key"), "provider.api_key");
        assert_eq!(map_env_key("agent_max_tool_rounds"), "agent.max_tool_rounds");
        assert_eq!(map_env_key("media_public_prefix"), "media.public_prefix");
        assert_eq!(map_env_key("gateway_port"), "gateway.port");
    }

    #[test]
    fn unknown_env_sections_pass_through() {
        assert_eq!(map_env_key("something_else"), "something_else");
        assert_eq!(map_env_key("agentx"), "agentx");
    }
}
