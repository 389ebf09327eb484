// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shopkeep serve` command implementation.
//!
//! Opens SQLite storage and the media directory, connects the text-generation
//! provider, assembles the chat pipeline and serves the HTTP API until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use shopkeep_agent::{CatalogService, ChatOrchestrator};
use shopkeep_config::model::ShopConfig;
use shopkeep_core::{PluginAdapter, ShopError, StorageAdapter};
use shopkeep_gateway::{GatewayState, HealthState, ServerConfig, start_server};
use shopkeep_openai::OpenAiProvider;
use shopkeep_storage::{LocalBlobStore, SqliteStorage};
use tracing::{info, warn};

/// Runs the `shopkeep serve` command.
pub async fn run_serve(config: ShopConfig) -> Result<(), ShopError> {
    info!(name = %config.agent.name, "starting shopkeep serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage initialized");

    tokio::fs::create_dir_all(&config.media.root_dir)
        .await
        .map_err(ShopError::storage)?;
    let blobs = Arc::new(LocalBlobStore::new(&config.media));

    let provider = Arc::new(OpenAiProvider::new(&config.provider)?);
    info!(model = %config.provider.default_model, "provider ready");

    let orchestrator = ChatOrchestrator::from_config(
        &config,
        provider.clone(),
        storage.clone(),
        storage.clone(),
        blobs.clone(),
    )
    .await;
    let catalog = CatalogService::new(storage.clone(), storage.clone(), blobs.clone());

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        media_root: PathBuf::from(&config.media.root_dir),
        public_prefix: config.media.public_prefix.clone(),
        max_upload_bytes: config.media.max_upload_bytes,
    };
    let state = GatewayState {
        orchestrator: Arc::new(orchestrator),
        catalog: Arc::new(catalog),
        history_limit: config.gateway.history_limit,
        health: HealthState {
            start_time: Instant::now(),
            adapters: vec![
                storage.clone() as Arc<dyn PluginAdapter>,
                blobs as Arc<dyn PluginAdapter>,
                provider as Arc<dyn PluginAdapter>,
            ],
        },
    };

    let served = start_server(&server_config, state).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    info!("shopkeep serve stopped");
    served
}
