// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for the Shopkeep catalog assistant.
//!
//! Exposes the chat turn, image attachment, manual product form, catalog
//! listing and filtering, conversation history and retrieval over axum, and
//! serves stored product images.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
