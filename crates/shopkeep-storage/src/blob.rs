// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-filesystem image store.
//!
//! Images are written to `<root>/products/<product_id>-<suffix>.<ext>` and
//! served by the gateway under `<public_prefix>/products/...`.

use std::path::PathBuf;

use async_trait::async_trait;
use shopkeep_config::model::MediaConfig;
use shopkeep_core::{AdapterType, BlobStore, HealthStatus, ImageBlob, PluginAdapter, ShopError};
use tracing::info;

/// Subdirectory product images are stored in.
const PRODUCTS_DIR: &str = "products";

/// Blob store writing files under a local media root.
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root_dir),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Directory the gateway should serve at the public prefix.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

/// Keeps ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
fn safe_file_stem(product_id: &str) -> String {
    product_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl PluginAdapter for LocalBlobStore {
    fn name(&self) -> &str {
        "local-fs"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::BlobStore
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            // Created lazily on first upload.
            Err(_) => Ok(HealthStatus::Degraded(format!(
                "{} does not exist yet",
                self.root.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, product_id: &str, blob: &ImageBlob) -> Result<String, ShopError> {
        let ext = blob
            .image_extension()
            .ok_or_else(|| ShopError::Validation("Upload a valid image.".to_string()))?;

        let dir = self.root.join(PRODUCTS_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(ShopError::storage)?;

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let file_name = format!("{}-{}.{ext}", safe_file_stem(product_id), &suffix[..8]);
        tokio::fs::write(dir.join(&file_name), &blob.bytes)
            .await
            .map_err(ShopError::storage)?;

        let url = format!("{}/{PRODUCTS_DIR}/{file_name}", self.public_prefix);
        info!(product_id, url = %url, bytes = blob.bytes.len(), "stored product image");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn png() -> ImageBlob {
        ImageBlob {
            file_name: "lamp.png".into(),
            content_type: Some("image/png".into()),
            bytes: b"\x89PNG\r\n\x1a\nrest-of-file".to_vec(),
        }
    }

    fn store_in(dir: &std::path::Path, prefix: &str) -> LocalBlobStore {
        LocalBlobStore::new(&MediaConfig {
            root_dir: dir.to_str().unwrap().to_string(),
            public_prefix: prefix.to_string(),
            max_upload_bytes: 1024,
        })
    }

    #[test]
    fn file_stems_are_sanitized() {
        assert_eq!(safe_file_stem("ab12-cd_34"), "ab12-cd_34");
        assert_eq!(safe_file_stem("../etc/passwd"), "___etc_passwd");
    }

    #[tokio::test]
    async fn store_writes_file_and_returns_public_url() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path(), "/media/");

        let url = store.store("ab12cd34", &png()).await.unwrap();
        assert!(url.starts_with("/media/products/ab12cd34-"), "got {url}");
        assert!(url.ends_with(".png"));

        let file_name = url.rsplit('/').next().unwrap();
        let written = std::fs::read(dir.path().join("products").join(file_name)).unwrap();
        assert_eq!(written, png().bytes);
    }

    #[tokio::test]
    async fn non_image_payload_is_rejected() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path(), "/media");
        let blob = ImageBlob {
            file_name: "notes.png".into(),
            content_type: Some("image/png".into()),
            bytes: b"plain text".to_vec(),
        };
        assert!(matches!(
            store.store("p1", &blob).await,
            Err(ShopError::Validation(_))
        ));
        assert!(!dir.path().join("products").exists());
    }

    #[tokio::test]
    async fn health_degraded_until_root_exists() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir.path().join("later"), "/media");
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
        store.store("p1", &png()).await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
