// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog and conversation-log operations consumed by the chat pipeline.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::types::{CatalogEntry, ConversationTurn, NewCatalogEntry};

/// Durable product catalog keyed by the external `product_id`.
///
/// Entries are never deleted through this trait. Listings are ordered by
/// ascending price.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Looks up an entry by its external id.
    async fn get_by_product_id(&self, product_id: &str)
    -> Result<Option<CatalogEntry>, ShopError>;

    /// Inserts a new entry. Fails with [`ShopError::Conflict`] if `product_id`
    /// is already taken.
    async fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, ShopError>;

    /// Overwrites name, price and description of the entry with the same
    /// `product_id`, leaving `created_at` and the image untouched.
    async fn update(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, ShopError>;

    /// Records the public image URL for an existing entry.
    async fn set_image(&self, product_id: &str, image_url: &str) -> Result<(), ShopError>;

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, ShopError>;

    /// Case-insensitive substring match on the product name.
    async fn filter_by_name_substring(&self, text: &str)
    -> Result<Vec<CatalogEntry>, ShopError>;
}

/// Append-only log of chat turns.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Appends a turn and returns its row id.
    async fn append(
        &self,
        user_message: &str,
        serialized_response: &str,
        session_id: &str,
    ) -> Result<i64, ShopError>;

    /// The `n` most recent turns, newest first.
    async fn list_recent(&self, n: usize) -> Result<Vec<ConversationTurn>, ShopError>;

    /// The most recent turn recorded for `session_id`, if any.
    async fn latest_for_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ConversationTurn>, ShopError>;
}
