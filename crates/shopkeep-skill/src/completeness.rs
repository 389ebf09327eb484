// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checks which required product fields are still missing.

use shopkeep_core::ProductIntent;

/// Names of the empty required fields, in the order they are asked for.
pub fn missing_fields(intent: &ProductIntent) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if intent.product_name.trim().is_empty() {
        missing.push("product name");
    }
    if intent.product_price.trim().is_empty() {
        missing.push("price");
    }
    if intent.product_description.trim().is_empty() {
        missing.push("description");
    }
    missing
}

/// Prompt asking for the missing fields, or a ready-to-confirm summary when
/// nothing is missing.
pub fn completeness_message(intent: &ProductIntent) -> String {
    let missing = missing_fields(intent);
    if missing.is_empty() {
        format!(
            "Ready to create product: {} for ${}",
            intent.product_name, intent.product_price
        )
    } else {
        format!(
            "I need the following information to create the product: {}. Please provide them.",
            missing.join(", ")
        )
    }
}
