// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the text-generation service.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for a text-generation service.
///
/// A single request/response call. The request may carry tool definitions
/// (the model may answer with tool calls) and an optional response schema
/// (the model's text answer must then be JSON conforming to it). Failures and
/// timeouts surface as [`ShopError::Provider`] or [`ShopError::Timeout`].
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ShopError>;
}
