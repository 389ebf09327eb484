// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Shopkeep integration tests.
//!
//! Provides a scripted provider and a harness that wires the full chat
//! pipeline against a temporary SQLite database and media root.
//!
//! # Components
//!
//! - [`MockProvider`] - Provider adapter replaying scripted replies
//! - [`TestHarness`] - Orchestrator, catalog service and stores on temp storage

pub mod harness;
pub mod mock_provider;

pub use harness::{PNG_BYTES, TestHarness, TestHarnessBuilder};
pub use mock_provider::{MockProvider, MockReply};
