// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `extract_product_info`: runs the field extractor over the user's words.

use async_trait::async_trait;
use shopkeep_core::ShopError;
use tracing::debug;

use crate::builtin::SharedIntent;
use crate::extractor::{self, GUIDANCE_MESSAGE};
use crate::tool::{Tool, ToolOutput};

/// Extracts product fields into the shared intent, only on an explicit
/// creation request.
pub struct ExtractProductInfoTool {
    intent: SharedIntent,
}

impl ExtractProductInfoTool {
    pub fn new(intent: SharedIntent) -> Self {
        Self { intent }
    }
}

#[async_trait]
impl Tool for ExtractProductInfoTool {
    fn name(&self) -> &str {
        "extract_product_info"
    }

    fn description(&self) -> &str {
        "Extract product information from user input only when the user explicitly wants to add a product"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_input": {
                    "type": "string",
                    "description": "The user's message, verbatim"
                }
            },
            "required": ["user_input"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, ShopError> {
        let Some(user_input) = input["user_input"].as_str() else {
            return Ok(ToolOutput::error("missing required parameter: user_input"));
        };

        let extraction = extractor::extract(user_input);
        if !extraction.is_add {
            return Ok(ToolOutput::text(GUIDANCE_MESSAGE));
        }

        let mut intent = self.intent.lock().await;
        extractor::merge_found(&mut intent, &extraction.fields);
        debug!(
            name = %intent.product_name,
            price = %intent.product_price,
            "extracted product fields"
        );
        Ok(ToolOutput::text(extractor::extracted_message(&intent)))
    }
}
