// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Shopkeep catalog assistant.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The primary error type used across all Shopkeep adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, blob I/O).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Text-generation provider errors (transport failure, bad status, unparseable output).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller supplied input that cannot be acted on (empty message, bad image, missing id).
    #[error("{0}")]
    Validation(String),

    /// Manual product form failed one or more field checks.
    #[error("{0}")]
    Form(FieldErrors),

    /// A referenced catalog entry does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A catalog entry with the same `product_id` already exists.
    #[error("{0}")]
    Conflict(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        ShopError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ShopError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for errors caused by the caller's input rather than a fault
    /// on our side or upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ShopError::Validation(_)
                | ShopError::Form(_)
                | ShopError::NotFound(_)
                | ShopError::Conflict(_)
        )
    }

    /// Returns true for failures of the text-generation service.
    pub fn is_upstream(&self) -> bool {
        matches!(self, ShopError::Provider { .. } | ShopError::Timeout { .. })
    }
}

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field. A field may collect several messages.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Converts into `Err(ShopError::Form)` when any field failed, `Ok(())` otherwise.
    pub fn into_result(self) -> Result<(), ShopError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ShopError::Form(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}
