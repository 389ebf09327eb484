// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `shopkeep history` and `shopkeep products`: read-only views of the database.

use shopkeep_config::model::ShopConfig;
use shopkeep_core::types::{CatalogEntry, ConversationTurn};
use shopkeep_core::{CatalogStore, ConversationLog, ShopError, StorageAdapter};
use shopkeep_storage::SqliteStorage;

async fn open_storage(config: &ShopConfig) -> Result<SqliteStorage, ShopError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(storage)
}

/// Prints the most recent `limit` turns.
pub async fn run_history(config: &ShopConfig, limit: usize) -> Result<(), ShopError> {
    let storage = open_storage(config).await?;
    let turns = storage.list_recent(limit).await?;
    storage.close().await?;

    if turns.is_empty() {
        println!("No conversation history.");
    }
    for turn in &turns {
        println!("{}", format_turn(turn));
    }
    Ok(())
}

/// Prints catalog entries, optionally filtered by a name substring.
pub async fn run_products(config: &ShopConfig, filter: Option<&str>) -> Result<(), ShopError> {
    let storage = open_storage(config).await?;
    let entries = match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(text) => storage.filter_by_name_substring(text).await?,
        None => storage.list_all().await?,
    };
    storage.close().await?;

    if entries.is_empty() {
        println!("No products.");
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_turn(turn: &ConversationTurn) -> String {
    let reply = turn
        .result()
        .map(|r| r.agent_message)
        .unwrap_or_else(|_| turn.agent_response.clone());
    format!(
        "[{}] ({}) > {}\n    {}",
        turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
        turn.session_id,
        turn.user_message,
        reply
    )
}

fn format_entry(entry: &CatalogEntry) -> String {
    let mut line = format!("{:<20} {:>12}  {}", entry.product_id, entry.price, entry.name);
    if let Some(image) = &entry.image {
        line.push_str(&format!("  [{image}]"));
    }
    line
}
