// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage, catalog and conversation-log traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use shopkeep_config::model::StorageConfig;
use shopkeep_core::{
    AdapterType, CatalogEntry, CatalogStore, ConversationLog, ConversationTurn, HealthStatus,
    NewCatalogEntry, PluginAdapter, ShopError, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ShopError> {
        self.db.get().ok_or_else(|| ShopError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ShopError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ShopError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ShopError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ShopError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ShopError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteStorage {
    async fn get_by_product_id(
        &self,
        product_id: &str,
    ) -> Result<Option<CatalogEntry>, ShopError> {
        queries::products::get_by_product_id(self.db()?, product_id).await
    }

    async fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, ShopError> {
        queries::products::insert_product(self.db()?, entry).await
    }

    async fn update(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, ShopError> {
        let product_id = entry.product_id.clone();
        queries::products::update_product(self.db()?, entry)
            .await?
            .ok_or_else(|| ShopError::NotFound(format!("Product {product_id} not found")))
    }

    async fn set_image(&self, product_id: &str, image_url: &str) -> Result<(), ShopError> {
        if queries::products::set_image(self.db()?, product_id, image_url).await? {
            Ok(())
        } else {
            Err(ShopError::NotFound(format!("Product {product_id} not found")))
        }
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, ShopError> {
        queries::products::list_products(self.db()?).await
    }

    async fn filter_by_name_substring(
        &self,
        text: &str,
    ) -> Result<Vec<CatalogEntry>, ShopError> {
        queries::products::filter_by_name(self.db()?, text).await
    }
}

#[async_trait]
impl ConversationLog for SqliteStorage {
    async fn append(
        &self,
        user_message: &str,
        serialized_response: &str,
        session_id: &str,
    ) -> Result<i64, ShopError> {
        queries::conversations::append_turn(self.db()?, user_message, serialized_response, session_id)
            .await
    }

    async fn list_recent(&self, n: usize) -> Result<Vec<ConversationTurn>, ShopError> {
        queries::conversations::list_recent(self.db()?, n).await
    }

    async fn latest_for_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ConversationTurn>, ShopError> {
        queries::conversations::latest_for_session(self.db()?, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    async fn initialized() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shop.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        (storage, dir)
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let storage = SqliteStorage::new(make_config("unused.db"));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let (storage, _dir) = initialized().await;
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn queries_fail_before_initialize() {
        let storage = SqliteStorage::new(make_config("never.db"));
        assert!(matches!(
            storage.list_all().await,
            Err(ShopError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn catalog_round_trip_through_trait() {
        let (storage, _dir) = initialized().await;
        let catalog: &dyn CatalogStore = &storage;

        let entry = NewCatalogEntry {
            product_id: "ab12cd34".into(),
            name: "Lamp".into(),
            price: Decimal::new(2550, 2),
            description: Some("desk lamp".into()),
        };
        catalog.create(entry.clone()).await.unwrap();

        let updated = catalog
            .update(NewCatalogEntry {
                price: Decimal::new(3000, 2),
                ..entry
            })
            .await
            .unwrap();
        assert_eq!(updated.price.to_string(), "30.00");
        assert_eq!(catalog.list_all().await.unwrap().len(), 1);

        catalog.set_image("ab12cd34", "/media/x.png").await.unwrap();
        assert!(matches!(
            catalog.set_image("zz", "/media/y.png").await,
            Err(ShopError::NotFound(_))
        ));
        assert!(matches!(
            catalog
                .update(NewCatalogEntry {
                    product_id: "zz".into(),
                    name: "Ghost".into(),
                    price: Decimal::ONE,
                    description: None,
                })
                .await,
            Err(ShopError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn conversation_log_through_trait() {
        let (storage, _dir) = initialized().await;
        let log: &dyn ConversationLog = &storage;
        let id = log.append("hello", "{}", "anonymous").await.unwrap();
        assert!(id > 0);
        let recent = log.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].session_id, "anonymous");
        assert!(log.latest_for_session("anonymous").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let (storage, _dir) = initialized().await;
        storage.shutdown().await.unwrap();
        storage.close().await.unwrap();
    }
}
