// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request coordination of a chat turn and of image attachment.

use std::sync::Arc;

use rust_decimal::Decimal;
use shopkeep_config::model::ShopConfig;
use shopkeep_core::error::ShopError;
use shopkeep_core::traits::{BlobStore, CatalogStore, ConversationLog, ProviderAdapter};
use shopkeep_core::types::{
    ANONYMOUS_SESSION, CatalogEntry, ChatTurnResult, ImageAttachResult, ImageBlob,
    NewCatalogEntry, ProductIntent,
};
use tracing::{debug, info, warn};

use crate::intent::IntentAgent;
use crate::price::{convert_to_decimal, is_catalog_price};
use crate::prompt::load_system_prompt;
use crate::resolver::OutputResolver;

/// Longest external product id the catalog accepts.
pub const MAX_PRODUCT_ID_LEN: usize = 20;

/// Longest product name the catalog accepts.
pub const MAX_NAME_LEN: usize = 200;

/// Drives a chat turn from raw message to catalog mutation and log entry.
///
/// Holds no per-turn state; concurrent turns share only the stores.
pub struct ChatOrchestrator {
    agent: IntentAgent,
    resolver: OutputResolver,
    catalog: Arc<dyn CatalogStore>,
    log: Arc<dyn ConversationLog>,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
}

impl ChatOrchestrator {
    pub fn new(
        agent: IntentAgent,
        resolver: OutputResolver,
        catalog: Arc<dyn CatalogStore>,
        log: Arc<dyn ConversationLog>,
        blobs: Arc<dyn BlobStore>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            agent,
            resolver,
            catalog,
            log,
            blobs,
            max_upload_bytes,
        }
    }

    /// Assembles the pipeline from configuration, loading the agent's system prompt.
    pub async fn from_config(
        config: &ShopConfig,
        provider: Arc<dyn ProviderAdapter>,
        catalog: Arc<dyn CatalogStore>,
        log: Arc<dyn ConversationLog>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let system_prompt = load_system_prompt(&config.agent).await;
        let agent = IntentAgent::new(
            provider.clone(),
            system_prompt,
            config.agent.max_tool_rounds,
        );
        let resolver = OutputResolver::new(provider, config.agent.enforce_trigger_gate);
        Self::new(
            agent,
            resolver,
            catalog,
            log,
            blobs,
            config.media.max_upload_bytes,
        )
    }

    /// Handles one chat turn.
    ///
    /// An empty message is a validation error and touches nothing. A failure
    /// of either model call yields an unsuccessful [`ChatTurnResult`] carrying
    /// the apology and is not logged. Storage failures propagate.
    pub async fn handle_turn(
        &self,
        user_message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatTurnResult, ShopError> {
        let user_message = user_message.trim();
        if user_message.is_empty() {
            return Err(ShopError::Validation("Message cannot be empty".into()));
        }
        let session_id = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(ANONYMOUS_SESSION);

        let (reply, intent) = match self.understand(user_message).await {
            Ok(understood) => understood,
            Err(e) => {
                warn!(session = session_id, error = %e, "chat turn failed upstream");
                return Ok(ChatTurnResult::failure(e.to_string()));
            }
        };

        let price = convert_to_decimal(Some(&intent.product_price));
        let trigger_upload = intent.is_actionable() && is_catalog_price(price);
        if intent.is_actionable() && !trigger_upload {
            warn!(
                session = session_id,
                price = %price,
                "resolved price is outside the catalog range, entry not stored"
            );
        }

        let result = if trigger_upload {
            let entry = self.upsert(&intent, price).await?;
            ChatTurnResult {
                success: true,
                agent_message: reply,
                is_add: true,
                product_id: Some(entry.product_id),
                product_name: Some(entry.name),
                product_price: Some(entry.price.to_string()),
                product_description: entry.description,
                trigger_upload: true,
                error: None,
            }
        } else {
            ChatTurnResult {
                success: true,
                agent_message: reply,
                is_add: intent.is_add,
                product_id: intent.product_id,
                product_name: non_empty(intent.product_name),
                product_price: non_empty(intent.product_price)
                    .map(|raw| convert_to_decimal(Some(&raw)).to_string()),
                product_description: non_empty(intent.product_description),
                trigger_upload: false,
                error: None,
            }
        };

        let serialized = serde_json::to_string(&result)
            .map_err(|e| ShopError::Internal(format!("failed to serialize turn result: {e}")))?;
        let turn_id = self.log.append(user_message, &serialized, session_id).await?;

        info!(
            session = session_id,
            turn_id,
            is_add = result.is_add,
            trigger_upload,
            "chat turn handled"
        );
        Ok(result)
    }

    /// Attaches an uploaded image to an existing catalog entry.
    pub async fn attach_image(
        &self,
        product_id: &str,
        blob: ImageBlob,
    ) -> Result<ImageAttachResult, ShopError> {
        let product_id = product_id.trim();
        if product_id.is_empty() {
            return Err(ShopError::Validation("Product ID is required".into()));
        }
        if blob.bytes.len() > self.max_upload_bytes {
            return Err(ShopError::Validation(format!(
                "Image is larger than the {} byte upload limit",
                self.max_upload_bytes
            )));
        }

        let entry = self
            .catalog
            .get_by_product_id(product_id)
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("Product {product_id} not found")))?;

        let image_url = self.blobs.store(product_id, &blob).await?;
        self.catalog.set_image(product_id, &image_url).await?;
        info!(product_id, image_url = image_url.as_str(), "image attached");

        Ok(ImageAttachResult {
            success: true,
            message: format!("Image uploaded successfully for product {product_id}"),
            image_url,
            trigger_upload: false,
            product_id: entry.product_id,
            product_name: entry.name,
            product_description: entry.description,
            product_price: entry.price.to_string(),
        })
    }

    async fn understand(&self, user_message: &str) -> Result<(String, ProductIntent), ShopError> {
        let outcome = self.agent.run(user_message).await?;
        let intent = self.resolver.resolve(user_message, &outcome.reply).await?;
        if outcome.collected.is_add != intent.is_add {
            debug!(
                tools_saw_add = outcome.collected.is_add,
                resolved_add = intent.is_add,
                tool_rounds = outcome.tool_rounds,
                "resolver disagrees with tool extraction"
            );
        }
        Ok((outcome.reply, intent))
    }

    /// Creates the entry or overwrites name, price and description of the
    /// existing one. Concurrent turns on one id race and the last write wins.
    async fn upsert(
        &self,
        intent: &ProductIntent,
        price: Decimal,
    ) -> Result<CatalogEntry, ShopError> {
        let entry = NewCatalogEntry {
            product_id: accept_product_id(intent.product_id.as_deref()),
            name: truncate_chars(&intent.product_name, MAX_NAME_LEN),
            price,
            description: non_empty(intent.product_description.clone()),
        };

        match self.catalog.get_by_product_id(&entry.product_id).await? {
            Some(_) => {
                debug!(product_id = entry.product_id.as_str(), "updating catalog entry");
                self.catalog.update(entry).await
            }
            None => {
                debug!(product_id = entry.product_id.as_str(), "creating catalog entry");
                match self.catalog.create(entry.clone()).await {
                    Err(ShopError::Conflict(_)) => {
                        debug!(
                            product_id = entry.product_id.as_str(),
                            "entry created concurrently, updating instead"
                        );
                        self.catalog.update(entry).await
                    }
                    other => other,
                }
            }
        }
    }
}

/// A fresh 8-hex-character product id. Collisions are possible but unlikely.
pub fn synthesize_product_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Uses the model-supplied id when the catalog can hold it, otherwise a fresh one.
fn accept_product_id(candidate: Option<&str>) -> String {
    match candidate {
        Some(id)
            if id.chars().count() <= MAX_PRODUCT_ID_LEN
                && !id.chars().any(char::is_whitespace) =>
        {
            id.to_string()
        }
        Some(id) => {
            let replacement = synthesize_product_id();
            warn!(
                rejected = id,
                replacement = replacement.as_str(),
                "model supplied an unusable product id"
            );
            replacement
        }
        None => synthesize_product_id(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_ids_are_eight_hex_chars() {
        let id = synthesize_product_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, synthesize_product_id());
    }

    #[test]
    fn model_ids_within_limits_are_kept() {
        assert_eq!(accept_product_id(Some("LAMP-001")), "LAMP-001");
    }

    #[test]
    fn oversized_or_spaced_ids_are_replaced() {
        let long = "x".repeat(21);
        let replaced = accept_product_id(Some(&long));
        assert_eq!(replaced.len(), 8);
        assert_ne!(accept_product_id(Some("desk lamp")), "desk lamp");
    }

    #[test]
    fn names_are_truncated_by_chars() {
        let name = "é".repeat(250);
        assert_eq!(truncate_chars(&name, MAX_NAME_LEN).chars().count(), 200);
        assert_eq!(truncate_chars("Lamp", MAX_NAME_LEN), "Lamp");
    }
}
