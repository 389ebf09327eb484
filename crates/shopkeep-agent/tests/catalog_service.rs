// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manual form, filtering and retrieval over real SQLite storage.

use std::sync::Arc;

use async_trait::async_trait;
use shopkeep_agent::catalog::{DUPLICATE_ID, NO_TURN_MESSAGE, NOTHING_TO_RETRIEVE_MESSAGE};
use shopkeep_agent::{CatalogService, ManualProductForm};
use shopkeep_core::{
    CatalogEntry, CatalogStore, ImageBlob, NewCatalogEntry, ProductIntent, ShopError,
};
use shopkeep_test_utils::TestHarness;

/// Catalog whose lookups never see existing rows, so the uniqueness check
/// passes and the insert is the first to notice a taken id.
struct StaleLookups(Arc<dyn CatalogStore>);

#[async_trait]
impl CatalogStore for StaleLookups {
    async fn get_by_product_id(&self, _product_id: &str) -> Result<Option<CatalogEntry>, ShopError> {
        Ok(None)
    }

    async fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, ShopError> {
        self.0.create(entry).await
    }

    async fn update(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, ShopError> {
        self.0.update(entry).await
    }

    async fn set_image(&self, product_id: &str, image_url: &str) -> Result<(), ShopError> {
        self.0.set_image(product_id, image_url).await
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, ShopError> {
        self.0.list_all().await
    }

    async fn filter_by_name_substring(&self, text: &str) -> Result<Vec<CatalogEntry>, ShopError> {
        self.0.filter_by_name_substring(text).await
    }
}

fn form(product_id: &str, name: &str, price: &str) -> ManualProductForm {
    ManualProductForm {
        product_id: product_id.into(),
        name: name.into(),
        price: price.into(),
        description: Some("from the form".into()),
        image: None,
    }
}

#[tokio::test]
async fn manual_form_creates_entry() {
    let h = TestHarness::builder().build().await.unwrap();
    let entry = h
        .catalog
        .create_manual(form("LAP001", "Laptop", "999.99"))
        .await
        .unwrap();
    assert_eq!(entry.product_id, "LAP001");
    assert_eq!(entry.price.to_string(), "999.99");
    assert_eq!(entry.description.as_deref(), Some("from the form"));
    assert_eq!(h.products().await.unwrap().len(), 1);
}

#[tokio::test]
async fn manual_form_collects_all_field_errors() {
    let h = TestHarness::builder().build().await.unwrap();
    let err = h
        .catalog
        .create_manual(form("", "", "0"))
        .await
        .unwrap_err();
    let ShopError::Form(errors) = err else {
        panic!("expected form errors, got {err:?}");
    };
    assert_eq!(errors.len(), 3);
    assert_eq!(errors.get("price").unwrap()[0], "Price must be greater than 0.");
    assert!(h.products().await.unwrap().is_empty());
}

#[tokio::test]
async fn manual_form_rejects_duplicate_id() {
    let h = TestHarness::builder().build().await.unwrap();
    h.catalog
        .create_manual(form("LAP001", "Laptop", "10"))
        .await
        .unwrap();
    let err = h
        .catalog
        .create_manual(form("LAP001", "Other", "20"))
        .await
        .unwrap_err();
    let ShopError::Form(errors) = err else {
        panic!("expected form errors");
    };
    assert_eq!(errors.get("product_id").unwrap()[0], DUPLICATE_ID);
}

#[tokio::test]
async fn manual_form_reports_id_taken_at_insert_as_field_error() {
    let h = TestHarness::builder().build().await.unwrap();
    h.catalog
        .create_manual(form("LAP001", "Laptop", "10"))
        .await
        .unwrap();

    let racing = CatalogService::new(
        Arc::new(StaleLookups(h.storage.clone())),
        h.storage.clone(),
        h.blobs.clone(),
    );
    let err = racing
        .create_manual(form("LAP001", "Other", "20"))
        .await
        .unwrap_err();

    let ShopError::Form(errors) = err else {
        panic!("expected form errors, got {err:?}");
    };
    assert_eq!(errors.get("product_id").unwrap()[0], DUPLICATE_ID);
    let products = h.products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Laptop");
}

#[tokio::test]
async fn manual_form_stores_image() {
    let h = TestHarness::builder().build().await.unwrap();
    let mut f = form("CAM1", "Camera", "120.00");
    f.image = Some(TestHarness::png("cam.png"));
    let entry = h.catalog.create_manual(f).await.unwrap();
    let url = entry.image.unwrap();
    assert!(url.starts_with("/media/products/CAM1-"));

    let mut bad = form("CAM2", "Camera 2", "120.00");
    bad.image = Some(ImageBlob {
        file_name: "notes.txt".into(),
        content_type: Some("text/plain".into()),
        bytes: b"hello".to_vec(),
    });
    let err = h.catalog.create_manual(bad).await.unwrap_err();
    assert!(matches!(err, ShopError::Form(ref e) if e.get("image").is_some()));
}

#[tokio::test]
async fn filter_by_name_or_all() {
    let h = TestHarness::builder().build().await.unwrap();
    for (id, name, price) in [("A", "Desk Lamp", "30"), ("B", "Chair", "10"), ("C", "lamp shade", "5")] {
        h.catalog.create_manual(form(id, name, price)).await.unwrap();
    }

    let lamps = h.catalog.filter(Some("LAMP")).await.unwrap();
    let names: Vec<_> = lamps.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["lamp shade", "Desk Lamp"]);

    assert_eq!(h.catalog.filter(Some("all")).await.unwrap().len(), 3);
    assert_eq!(h.catalog.filter(None).await.unwrap().len(), 3);
    assert_eq!(h.catalog.filter(Some("  ")).await.unwrap().len(), 3);

    let all = h.catalog.list().await.unwrap();
    let prices: Vec<_> = all.iter().map(|e| e.price.to_string()).collect();
    assert_eq!(prices, ["5.00", "10.00", "30.00"]);
}

#[tokio::test]
async fn retrieval_without_history() {
    let h = TestHarness::builder().build().await.unwrap();
    let retrieval = h.catalog.retrieve_for_session("anonymous").await.unwrap();
    assert_eq!(retrieval.message, NO_TURN_MESSAGE);
    assert!(retrieval.products.is_empty());
}

#[tokio::test]
async fn retrieval_when_turn_names_nothing() {
    let h = TestHarness::builder().build().await.unwrap();
    h.provider
        .script_turn("Hello!", &ProductIntent::default())
        .await;
    h.orchestrator.handle_turn("hi", Some("s1")).await.unwrap();

    let retrieval = h.catalog.retrieve_for_session("s1").await.unwrap();
    assert_eq!(retrieval.message, NOTHING_TO_RETRIEVE_MESSAGE);
}

#[tokio::test]
async fn retrieval_finds_by_name_and_id_once() {
    let h = TestHarness::builder().build().await.unwrap();
    h.catalog
        .create_manual(form("LAMP1", "Lamp", "25.50"))
        .await
        .unwrap();
    h.catalog
        .create_manual(form("LAMP2", "Floor Lamp", "80"))
        .await
        .unwrap();

    let intent = ProductIntent {
        product_id: Some("LAMP1".into()),
        product_name: "Lamp".into(),
        ..Default::default()
    };
    h.provider.script_turn("Here are the lamps.", &intent).await;
    h.orchestrator
        .handle_turn("show me lamps", Some("s2"))
        .await
        .unwrap();

    let retrieval = h.catalog.retrieve_for_session("s2").await.unwrap();
    assert_eq!(retrieval.message, "Found 2 products from agent response.");
    assert_eq!(retrieval.products.len(), 2);
    assert!(retrieval.products.iter().all(|p| p.found_by == "name: Lamp"));

    // Other sessions see nothing.
    let other = h.catalog.retrieve_for_session("s3").await.unwrap();
    assert_eq!(other.message, NO_TURN_MESSAGE);
}
