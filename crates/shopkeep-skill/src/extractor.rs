// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based product field extraction.
//!
//! This is permissive pattern matching, not a parser: malformed input yields
//! partial or empty fields, never an error. Nothing is extracted unless the
//! text contains one of the [`TRIGGER_PHRASES`].
//!
//! Rules, applied only when a trigger phrase is present:
//!
//! - **Name**: on a line containing `name:` (any case), the text after the last
//!   `name:` marker, trimmed. Otherwise, on a line with a whitespace-separated
//!   token `called`, the token right after it. Later lines win.
//! - **Price**: the first `$<digits>` or `$<digits>.<2 digits>` anywhere in the
//!   text, kept as the raw digits (no `$`).
//! - **Description**: on a line containing `description:`, the text after the
//!   last marker, trimmed. Later lines win.

use std::sync::LazyLock;

use regex::Regex;
use shopkeep_core::ProductIntent;

/// Phrases that signal an explicit request to create a product.
pub const TRIGGER_PHRASES: [&str; 4] = [
    "add product",
    "create product",
    "new product",
    "make product",
];

/// Reply used when the text does not ask for a product to be created.
pub const GUIDANCE_MESSAGE: &str =
    "I can help you add products. Please say 'add product' or 'create product' and provide the details.";

static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+(?:\.\d{2})?)").expect("price pattern is valid"));

const NAME_MARKER: &str = "name:";
const DESCRIPTION_MARKER: &str = "description:";

/// Result of running the extraction rules over one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Fields found in the text. Unfound fields are empty.
    pub fields: ProductIntent,
    /// True exactly when a trigger phrase was present.
    pub is_add: bool,
    /// Human-readable summary, or guidance when no trigger phrase was present.
    pub message: String,
}

/// Whether `text` contains a creation trigger phrase, ignoring case.
pub fn has_trigger(text: &str) -> bool {
    let lower = text.to_lowercase();
    TRIGGER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Runs the extraction rules over `text`.
pub fn extract(text: &str) -> Extraction {
    if !has_trigger(text) {
        return Extraction {
            fields: ProductIntent::default(),
            is_add: false,
            message: GUIDANCE_MESSAGE.to_string(),
        };
    }

    let mut fields = ProductIntent {
        is_add: true,
        ..ProductIntent::default()
    };

    for line in text.lines() {
        if let Some(name) = after_last_marker(line, NAME_MARKER) {
            fields.product_name = name.to_string();
        } else if let Some(name) = word_after_called(line) {
            fields.product_name = name.to_string();
        }

        if let Some(description) = after_last_marker(line, DESCRIPTION_MARKER) {
            fields.product_description = description.to_string();
        }
    }

    if let Some(caps) = PRICE_PATTERN.captures(text) {
        fields.product_price = caps[1].to_string();
    }

    let message = extracted_message(&fields);
    Extraction {
        fields,
        is_add: true,
        message,
    }
}

/// Copies every non-empty field of `found` onto `target` and marks it as an add request.
pub fn merge_found(target: &mut ProductIntent, found: &ProductIntent) {
    if !found.product_name.is_empty() {
        target.product_name = found.product_name.clone();
    }
    if !found.product_price.is_empty() {
        target.product_price = found.product_price.clone();
    }
    if !found.product_description.is_empty() {
        target.product_description = found.product_description.clone();
    }
    if found.product_id.is_some() {
        target.product_id = found.product_id.clone();
    }
    target.is_add = true;
}

/// Summary reported after a successful extraction.
pub fn extracted_message(intent: &ProductIntent) -> String {
    format!(
        "Product information extracted from your request. Name: {}, Price: ${}, Description: {}",
        intent.product_name, intent.product_price, intent.product_description
    )
}

/// Trimmed text after the last case-insensitive occurrence of `marker` in `line`.
fn after_last_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets aligned with `line`.
    let lower = line.to_ascii_lowercase();
    lower
        .rfind(marker)
        .map(|pos| line[pos + marker.len()..].trim())
}

fn word_after_called(line: &str) -> Option<&str> {
    let mut words = line.split_whitespace();
    words.find(|w| w.eq_ignore_ascii_case("called"))?;
    words.next()
}
