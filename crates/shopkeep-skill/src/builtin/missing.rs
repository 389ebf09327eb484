// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `get_missing_info`: reports which product fields are still needed.

use async_trait::async_trait;
use shopkeep_core::ShopError;

use crate::builtin::SharedIntent;
use crate::completeness::completeness_message;
use crate::tool::{Tool, ToolOutput};

pub struct MissingInfoTool {
    intent: SharedIntent,
}

impl MissingInfoTool {
    pub fn new(intent: SharedIntent) -> Self {
        Self { intent }
    }
}

#[async_trait]
impl Tool for MissingInfoTool {
    fn name(&self) -> &str {
        "get_missing_info"
    }

    fn description(&self) -> &str {
        "Check what product information is missing and ask the user for it"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn invoke(&self, _input: serde_json::Value) -> Result<ToolOutput, ShopError> {
        let intent = self.intent.lock().await;
        Ok(ToolOutput::text(completeness_message(&intent)))
    }
}
