// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog operations outside the chat turn: manual creation, listing,
//! filtering and retrieval of the products a prior turn referred to.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shopkeep_core::error::{FieldErrors, ShopError};
use shopkeep_core::traits::{BlobStore, CatalogStore, ConversationLog};
use shopkeep_core::types::{
    CatalogEntry, ChatTurnResult, ConversationTurn, ImageBlob, NewCatalogEntry,
};
use tracing::{debug, info, warn};

use crate::orchestrator::{MAX_NAME_LEN, MAX_PRODUCT_ID_LEN};

const MAX_PRICE_DIGITS: u32 = 10;
const MAX_PRICE_PLACES: u32 = 2;

const REQUIRED: &str = "This field is required.";

/// Field error for a `product_id` that is already taken.
pub const DUPLICATE_ID: &str = "This product ID already exists. Please choose a different one.";

/// Message when a session has no recorded turn.
pub const NO_TURN_MESSAGE: &str = "No agent response found. Please chat first.";

/// Message when the latest turn names no product.
pub const NOTHING_TO_RETRIEVE_MESSAGE: &str =
    "Agent response does not indicate product retrieval needed.";

/// Raw fields of the manual product form.
#[derive(Debug, Clone, Default)]
pub struct ManualProductForm {
    pub product_id: String,
    pub name: String,
    pub price: String,
    pub description: Option<String>,
    pub image: Option<ImageBlob>,
}

/// A catalog entry found while resolving a prior turn, with how it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundProduct {
    pub entry: CatalogEntry,
    /// `"name: {name}"` or `"ID: {product_id}"`.
    pub found_by: String,
}

/// Outcome of a retrieval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Retrieval {
    pub message: String,
    pub products: Vec<FoundProduct>,
}

/// Catalog operations shared by the HTTP API and the CLI.
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
    log: Arc<dyn ConversationLog>,
    blobs: Arc<dyn BlobStore>,
}

impl CatalogService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        log: Arc<dyn ConversationLog>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            catalog,
            log,
            blobs,
        }
    }

    /// All entries, cheapest first.
    pub async fn list(&self) -> Result<Vec<CatalogEntry>, ShopError> {
        self.catalog.list_all().await
    }

    /// Case-insensitive name filter. A missing, blank or `"all"` name lists everything.
    pub async fn filter(&self, name: Option<&str>) -> Result<Vec<CatalogEntry>, ShopError> {
        match name.map(str::trim) {
            Some(text) if !text.is_empty() && text != "all" => {
                self.catalog.filter_by_name_substring(text).await
            }
            _ => self.catalog.list_all().await,
        }
    }

    /// The `limit` most recent conversation turns, newest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<ConversationTurn>, ShopError> {
        self.log.list_recent(limit).await
    }

    /// Validates and stores a manually entered product.
    ///
    /// All field problems are collected into one [`ShopError::Form`].
    pub async fn create_manual(&self, form: ManualProductForm) -> Result<CatalogEntry, ShopError> {
        let mut errors = FieldErrors::new();

        let product_id = form.product_id.trim().to_string();
        if product_id.is_empty() {
            errors.add("product_id", REQUIRED);
        } else if product_id.chars().count() > MAX_PRODUCT_ID_LEN {
            errors.add(
                "product_id",
                max_length_message(MAX_PRODUCT_ID_LEN, product_id.chars().count()),
            );
        } else if self.catalog.get_by_product_id(&product_id).await?.is_some() {
            errors.add("product_id", DUPLICATE_ID);
        }

        let name = form.name.trim().to_string();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.add("name", max_length_message(MAX_NAME_LEN, name.chars().count()));
        }

        let price = match validate_price(&form.price) {
            Ok(price) => Some(price),
            Err(message) => {
                errors.add("price", message);
                None
            }
        };

        if form
            .image
            .as_ref()
            .is_some_and(|image| image.image_extension().is_none())
        {
            errors.add(
                "image",
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
            );
        }

        if !errors.is_empty() {
            debug!(fields = errors.len(), "manual product form rejected");
        }
        errors.into_result()?;
        let Some(price) = price else {
            return Err(ShopError::Internal("price accepted without a value".into()));
        };

        let description = form
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let created = self
            .catalog
            .create(NewCatalogEntry {
                product_id: product_id.clone(),
                name,
                price,
                description,
            })
            .await;
        // A concurrent submission can take the id between the check and the insert.
        let mut entry = match created {
            Err(ShopError::Conflict(_)) => {
                let mut errors = FieldErrors::new();
                errors.add("product_id", DUPLICATE_ID);
                return Err(ShopError::Form(errors));
            }
            other => other?,
        };

        if let Some(image) = form.image {
            let url = self.blobs.store(&product_id, &image).await?;
            self.catalog.set_image(&product_id, &url).await?;
            entry.image = Some(url);
        }

        info!(product_id = product_id.as_str(), "product created from form");
        Ok(entry)
    }

    /// Products referenced by a turn result: matched by name substring and by
    /// exact id, each entry reported once with the first way it was found.
    pub async fn find_for_turn(
        &self,
        result: &ChatTurnResult,
    ) -> Result<Vec<FoundProduct>, ShopError> {
        let mut found: Vec<FoundProduct> = Vec::new();

        if let Some(name) = result.product_name.as_deref().filter(|n| !n.is_empty()) {
            for entry in self.catalog.filter_by_name_substring(name).await? {
                push_unique(&mut found, entry, format!("name: {name}"));
            }
        }

        if let Some(id) = result.product_id.as_deref().filter(|id| !id.is_empty()) {
            if let Some(entry) = self.catalog.get_by_product_id(id).await? {
                push_unique(&mut found, entry, format!("ID: {id}"));
            }
        }

        Ok(found)
    }

    /// Looks up the latest turn of `session_id` and retrieves what it referred to.
    pub async fn retrieve_for_session(&self, session_id: &str) -> Result<Retrieval, ShopError> {
        let Some(turn) = self.log.latest_for_session(session_id).await? else {
            return Ok(Retrieval {
                message: NO_TURN_MESSAGE.to_string(),
                products: Vec::new(),
            });
        };

        let result = match turn.result() {
            Ok(result) => result,
            Err(e) => {
                warn!(turn_id = turn.id, error = %e, "recorded turn is not a turn result");
                return Ok(nothing_to_retrieve());
            }
        };

        if result.product_name.is_none() && result.product_id.is_none() {
            return Ok(nothing_to_retrieve());
        }

        let products = self.find_for_turn(&result).await?;
        Ok(Retrieval {
            message: format!("Found {} products from agent response.", products.len()),
            products,
        })
    }
}

fn nothing_to_retrieve() -> Retrieval {
    Retrieval {
        message: NOTHING_TO_RETRIEVE_MESSAGE.to_string(),
        products: Vec::new(),
    }
}

fn push_unique(found: &mut Vec<FoundProduct>, entry: CatalogEntry, found_by: String) {
    if !found.iter().any(|f| f.entry.id == entry.id) {
        found.push(FoundProduct { entry, found_by });
    }
}

fn max_length_message(max: usize, actual: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {actual}).")
}

/// Parses and range-checks a form price: positive, at most ten digits of
/// which at most two follow the decimal point.
fn validate_price(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let price = Decimal::from_str(raw).map_err(|_| "Enter a number.".to_string())?;
    if price <= Decimal::ZERO {
        return Err("Price must be greater than 0.".to_string());
    }

    let places = price.scale();
    let significant = price.mantissa().unsigned_abs().to_string().len() as u32;
    let digits = significant.max(places);
    if digits > MAX_PRICE_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {MAX_PRICE_DIGITS} digits in total."
        ));
    }
    if places > MAX_PRICE_PLACES {
        return Err(format!(
            "Ensure that there are no more than {MAX_PRICE_PLACES} decimal places."
        ));
    }
    let max_whole = MAX_PRICE_DIGITS - MAX_PRICE_PLACES;
    if digits - places > max_whole {
        return Err(format!(
            "Ensure that there are no more than {max_whole} digits before the decimal point."
        ));
    }

    let mut price = price;
    price.rescale(MAX_PRICE_PLACES);
    Ok(price)
}
