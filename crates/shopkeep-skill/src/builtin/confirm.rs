// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `confirm_product_creation`: summarizes the product once it is ready.

use async_trait::async_trait;
use shopkeep_core::{ProductIntent, ShopError};

use crate::builtin::SharedIntent;
use crate::tool::{Tool, ToolOutput};

const INCOMPLETE: &str = "Product information incomplete or not requested.";

pub struct ConfirmProductTool {
    intent: SharedIntent,
}

impl ConfirmProductTool {
    pub fn new(intent: SharedIntent) -> Self {
        Self { intent }
    }
}

/// Ready summary when name, price and the add flag are all set.
pub fn confirmation_message(intent: &ProductIntent) -> String {
    if intent.is_actionable() {
        let description = if intent.product_description.is_empty() {
            "No description"
        } else {
            intent.product_description.as_str()
        };
        format!(
            "Product ready: {} - ${}. Description: {description}",
            intent.product_name, intent.product_price
        )
    } else {
        INCOMPLETE.to_string()
    }
}

#[async_trait]
impl Tool for ConfirmProductTool {
    fn name(&self) -> &str {
        "confirm_product_creation"
    }

    fn description(&self) -> &str {
        "Confirm whether all information is ready for product creation"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn invoke(&self, _input: serde_json::Value) -> Result<ToolOutput, ShopError> {
        let intent = self.intent.lock().await;
        Ok(ToolOutput::text(confirmation_message(&intent)))
    }
}
