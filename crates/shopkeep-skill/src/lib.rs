// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tools available to the Shopkeep intent agent.
//!
//! The deterministic pieces of the pipeline live here: the rule-based
//! [`extractor`] and the [`completeness`] checker. The [`builtin`] tools wrap
//! them behind the [`Tool`] trait so the model can call them, all sharing one
//! per-turn [`ProductIntent`](shopkeep_core::ProductIntent).

pub mod builtin;
pub mod completeness;
pub mod extractor;
pub mod tool;

pub use builtin::{SharedIntent, product_tools};
pub use completeness::{completeness_message, missing_fields};
pub use extractor::{Extraction, TRIGGER_PHRASES, extract, has_trigger};
pub use tool::{Tool, ToolOutput, ToolRegistry};
