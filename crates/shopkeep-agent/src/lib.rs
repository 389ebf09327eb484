// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat pipeline for the Shopkeep catalog assistant.
//!
//! A chat turn flows through three stages:
//! - [`IntentAgent`] converses with the model, which may call the product tools
//! - [`OutputResolver`] reduces the message and reply to one [`ProductIntent`]
//! - [`ChatOrchestrator`] acts on that record against the catalog and
//!   conversation log
//!
//! [`CatalogService`] covers the non-conversational catalog operations
//! (manual form, listing, filtering, retrieval from a prior turn).
//!
//! [`ProductIntent`]: shopkeep_core::ProductIntent

pub mod catalog;
pub mod intent;
pub mod orchestrator;
pub mod price;
pub mod prompt;
pub mod resolver;

pub use catalog::{CatalogService, FoundProduct, ManualProductForm, Retrieval};
pub use intent::{IntentAgent, IntentOutcome};
pub use orchestrator::{ChatOrchestrator, synthesize_product_id};
pub use price::{convert_to_decimal, is_catalog_price};
pub use prompt::load_system_prompt;
pub use resolver::OutputResolver;
