// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence and local image storage for Shopkeep.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, the catalog and conversation-log
//! adapters, and a filesystem-backed [`BlobStore`](shopkeep_core::BlobStore).

pub mod adapter;
pub mod blob;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use blob::LocalBlobStore;
pub use database::Database;
