// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Shopkeep catalog assistant.
//!
//! This crate provides the error type, the domain and provider types, and the
//! adapter traits behind which the catalog, the conversation log, the
//! text-generation service and the blob store live.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{FieldErrors, ShopError};
pub use types::{
    ANONYMOUS_SESSION, AdapterType, CatalogEntry, ChatTurnResult, ConversationTurn,
    HealthStatus, ImageAttachResult, ImageBlob, NewCatalogEntry, ProductIntent,
    ProviderMessage, ProviderRequest, ProviderResponse, ResponseSchema, Role, TokenUsage,
    ToolCall, ToolDefinition,
};

pub use traits::{
    BlobStore, CatalogStore, ConversationLog, PluginAdapter, ProviderAdapter, StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_error_has_all_variants() {
        let _config = ShopError::Config("test".into());
        let _storage = ShopError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = ShopError::Provider {
            message: "test".into(),
            source: None,
        };
        let _validation = ShopError::Validation("test".into());
        let _form = ShopError::Form(FieldErrors::new());
        let _not_found = ShopError::NotFound("test".into());
        let _conflict = ShopError::Conflict("test".into());
        let _timeout = ShopError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = ShopError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Provider,
            AdapterType::Storage,
            AdapterType::BlobStore,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_catalog_store<T: CatalogStore>() {}
        fn _assert_conversation_log<T: ConversationLog>() {}
        fn _assert_blob_store<T: BlobStore>() {}
    }
}
