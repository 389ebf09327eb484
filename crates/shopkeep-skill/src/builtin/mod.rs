// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product tools offered to the intent agent.
//!
//! All three tools read and write the same [`SharedIntent`], which lives for
//! exactly one chat turn.

pub mod confirm;
pub mod extract;
pub mod missing;

pub use confirm::ConfirmProductTool;
pub use extract::ExtractProductInfoTool;
pub use missing::MissingInfoTool;

use std::sync::Arc;

use shopkeep_core::ProductIntent;
use tokio::sync::Mutex;

use crate::ToolRegistry;

/// The product intent being built during one turn, shared by the tools.
pub type SharedIntent = Arc<Mutex<ProductIntent>>;

/// Builds a registry holding the three product tools bound to `intent`.
pub fn product_tools(intent: &SharedIntent) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ExtractProductInfoTool::new(intent.clone())));
    registry.register(Arc::new(MissingInfoTool::new(intent.clone())));
    registry.register(Arc::new(ConfirmProductTool::new(intent.clone())));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_tools_registers_exactly_3_tools() {
        let intent = SharedIntent::default();
        let registry = product_tools(&intent);
        assert_eq!(registry.len(), 3);
        assert!(registry.get("extract_product_info").is_some());
        assert!(registry.get("get_missing_info").is_some());
        assert!(registry.get("confirm_product_creation").is_some());
    }

    #[tokio::test]
    async fn tools_share_one_intent() {
        let intent = SharedIntent::default();
        let registry = product_tools(&intent);

        let out = registry
            .dispatch(
                "extract_product_info",
                serde_json::json!({"user_input": "add product\nname: Lamp\n$25.50"}),
            )
            .await;
        assert!(!out.is_error);

        let missing = registry.dispatch("get_missing_info", serde_json::json!({})).await;
        assert_eq!(
            missing.content,
            "I need the following information to create the product: description. Please provide them."
        );

        let confirm = registry
            .dispatch("confirm_product_creation", serde_json::json!({}))
            .await;
        assert_eq!(
            confirm.content,
            "Product ready: Lamp - $25.50. Description: No description"
        );

        assert!(intent.lock().await.is_add);
    }
}
