// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry.
//!
//! The [`Tool`] trait is the interface every agent tool implements. The
//! [`ToolRegistry`] looks tools up by name and produces the provider-neutral
//! [`ToolDefinition`] list sent with each model request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopkeep_core::{ShopError, ToolDefinition};

/// Output from a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text handed back to the model.
    pub content: String,
    /// Whether the tool invocation resulted in an error.
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// A callable tool exposed to the model.
///
/// Every tool provides a name, description, JSON Schema for its parameters,
/// and an async `invoke` method. The agent loop calls `invoke` with the
/// parsed JSON arguments of the model's tool call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's unique name (used for lookup and API serialization).
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema describing the tool's input parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invokes the tool with the given JSON input and returns the output.
    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, ShopError>;
}

/// Registry of available tools, indexed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its `name()`, replacing any previous tool of that name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool definitions for a provider request, sorted by name so requests are
    /// stable across runs.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Invokes the named tool. Unknown names and tool failures come back as
    /// error outputs so the model can see them rather than aborting the turn.
    pub async fn dispatch(&self, name: &str, input: serde_json::Value) -> ToolOutput {
        let Some(tool) = self.get(name) else {
            tracing::warn!(tool = name, "model requested unknown tool");
            return ToolOutput::error(format!("unknown tool: {name}"));
        };
        match tool.invoke(input).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool invocation failed");
                ToolOutput::error(e.to_string())
            }
        }
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
