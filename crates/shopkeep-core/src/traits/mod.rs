// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the chat pipeline.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod blob;
pub mod catalog;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use blob::BlobStore;
pub use catalog::{CatalogStore, ConversationLog};
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
