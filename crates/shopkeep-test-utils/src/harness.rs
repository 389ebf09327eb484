// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles the chat orchestrator and catalog service over a
//! scripted [`MockProvider`], a temp SQLite database and a temp media root.

use std::sync::Arc;

use shopkeep_agent::{CatalogService, ChatOrchestrator};
use shopkeep_config::model::{AgentConfig, MediaConfig, ShopConfig, StorageConfig};
use shopkeep_core::traits::StorageAdapter;
use shopkeep_core::types::{CatalogEntry, ChatTurnResult, ConversationTurn, ImageBlob};
use shopkeep_core::{CatalogStore, ConversationLog, ShopError};
use shopkeep_storage::{LocalBlobStore, SqliteStorage};

use crate::mock_provider::{MockProvider, MockReply};

/// A minimal valid PNG header, enough for image sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    agent: AgentConfig,
    max_upload_bytes: Option<usize>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            agent: AgentConfig {
                system_prompt: Some("You are a test shopkeeper.".to_string()),
                ..AgentConfig::default()
            },
            max_upload_bytes: None,
        }
    }

    /// Set the provider script.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Replace the agent configuration.
    pub fn with_agent_config(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    /// Cap image uploads at `bytes`.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Build the harness, creating the temp database and media root.
    pub async fn build(self) -> Result<TestHarness, ShopError> {
        let temp_dir = tempfile::TempDir::new().map_err(ShopError::storage)?;
        let db_path = temp_dir.path().join("test.db");
        let media_root = temp_dir.path().join("media");

        let mut media = MediaConfig {
            root_dir: media_root.to_string_lossy().into_owned(),
            ..MediaConfig::default()
        };
        if let Some(bytes) = self.max_upload_bytes {
            media.max_upload_bytes = bytes;
        }

        let config = ShopConfig {
            agent: self.agent,
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().into_owned(),
                wal_mode: true,
            },
            media,
            ..ShopConfig::default()
        };

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        let blobs = Arc::new(LocalBlobStore::new(&config.media));
        let provider = Arc::new(MockProvider::with_replies(self.replies));

        let orchestrator = ChatOrchestrator::from_config(
            &config,
            provider.clone(),
            storage.clone(),
            storage.clone(),
            blobs.clone(),
        )
        .await;
        let catalog = CatalogService::new(storage.clone(), storage.clone(), blobs.clone());

        Ok(TestHarness {
            provider,
            storage,
            blobs,
            orchestrator: Arc::new(orchestrator),
            catalog: Arc::new(catalog),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete pipeline with a scripted provider and temp storage.
pub struct TestHarness {
    /// The scripted provider.
    pub provider: Arc<MockProvider>,
    /// SQLite catalog and conversation log (temp DB, removed on drop).
    pub storage: Arc<SqliteStorage>,
    /// Image store rooted in the temp directory.
    pub blobs: Arc<LocalBlobStore>,
    pub orchestrator: Arc<ChatOrchestrator>,
    pub catalog: Arc<CatalogService>,
    /// Effective configuration.
    pub config: ShopConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send one message through the full pipeline as an anonymous session.
    pub async fn chat(&self, message: &str) -> Result<ChatTurnResult, ShopError> {
        self.orchestrator.handle_turn(message, None).await
    }

    /// Every catalog entry, cheapest first.
    pub async fn products(&self) -> Result<Vec<CatalogEntry>, ShopError> {
        self.storage.list_all().await
    }

    /// All recorded turns, newest first.
    pub async fn history(&self) -> Result<Vec<ConversationTurn>, ShopError> {
        self.storage.list_recent(usize::MAX).await
    }

    /// A small PNG upload.
    pub fn png(file_name: &str) -> ImageBlob {
        ImageBlob {
            file_name: file_name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: PNG_BYTES.to_vec(),
        }
    }
}
