// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File/blob store for uploaded product images.

use async_trait::async_trait;

use crate::error::ShopError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ImageBlob;

/// Stores uploaded blobs and hands back a URL they can be fetched from.
#[async_trait]
pub trait BlobStore: PluginAdapter {
    /// Persists `blob` for `product_id` and returns its public URL.
    async fn store(&self, product_id: &str, blob: &ImageBlob) -> Result<String, ShopError>;
}
