// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::PluginAdapter;

/// Lifecycle of a persistence backend.
///
/// Concrete backends usually also implement [`CatalogStore`](crate::CatalogStore)
/// and [`ConversationLog`](crate::ConversationLog).
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ShopError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), ShopError>;
}
