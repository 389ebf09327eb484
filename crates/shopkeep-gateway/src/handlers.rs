// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use shopkeep_agent::{FoundProduct, ManualProductForm};
use shopkeep_core::types::{CatalogEntry, ConversationTurn, HealthStatus, ImageBlob};
use shopkeep_core::{ANONYMOUS_SESSION, ShopError};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Header carrying the caller's session id when the body does not.
pub const SESSION_HEADER: &str = "x-session-id";

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Request body for POST /v1/products/filter.
#[derive(Debug, Default, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveQuery {
    pub session_id: Option<String>,
}

/// Public view of a catalog entry.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub product_id: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<CatalogEntry> for ProductView {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            product_id: entry.product_id,
            name: entry.name,
            price: entry.price.to_string(),
            description: entry.description.unwrap_or_default(),
            image_url: entry.image,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// A retrieved product and how it matched.
#[derive(Debug, Serialize)]
pub struct FoundProductView {
    #[serde(flatten)]
    pub product: ProductView,
    pub found_by: String,
}

impl From<FoundProduct> for FoundProductView {
    fn from(found: FoundProduct) -> Self {
        Self {
            product: found.entry.into(),
            found_by: found.found_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductView>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub message: String,
    pub products: Vec<FoundProductView>,
}

#[derive(Debug, Serialize)]
pub struct ProductCreatedResponse {
    pub success: bool,
    pub message: String,
    pub product: ProductView,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_secs: u64,
    pub adapters: Vec<AdapterHealth>,
}

#[derive(Debug, Serialize)]
pub struct AdapterHealth {
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// POST /v1/chat
///
/// Runs one chat turn. An upstream failure still returns the turn result,
/// with `success: false` and status 502.
pub async fn post_chat(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) =
        body.map_err(|e| ShopError::Validation(format!("invalid chat body: {}", e.body_text())))?;
    let session_id = body.session_id.or_else(|| header_session(&headers));
    let result = state
        .orchestrator
        .handle_turn(&body.message, session_id.as_deref())
        .await?;

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(result)).into_response())
}

/// POST /v1/chat/image
///
/// Multipart fields: `product_id` (text) and `image` (file).
pub async fn post_chat_image(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = read_multipart(multipart).await?;
    let product_id = form.text.remove("product_id").unwrap_or_default();
    if product_id.trim().is_empty() {
        return Err(ShopError::Validation("Product ID is required".into()).into());
    }
    let image = form
        .image
        .ok_or_else(|| ShopError::Validation("Image file is required".into()))?;

    let result = state.orchestrator.attach_image(&product_id, image).await?;
    Ok(Json(result).into_response())
}

/// GET /v1/history?limit=N
pub async fn get_history(
    State(state): State<GatewayState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(state.history_limit);
    let history = state.catalog.history(limit).await?;
    Ok(Json(HistoryResponse { history }))
}

/// GET /v1/products
pub async fn get_products(
    State(state): State<GatewayState>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.catalog.list().await?;
    Ok(Json(product_list(products)))
}

/// POST /v1/products/filter
///
/// A missing body, missing name or `"all"` lists every product.
pub async fn post_filter_products(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Json<ProductListResponse>, ApiError> {
    let body: FilterRequest = if body.iter().all(u8::is_ascii_whitespace) {
        FilterRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ShopError::Validation(format!("invalid filter body: {e}")))?
    };
    let products = state.catalog.filter(body.name.as_deref()).await?;
    Ok(Json(product_list(products)))
}

/// POST /v1/products
///
/// Multipart manual form: `product_id`, `name`, `price`, optional
/// `description` and `image`.
pub async fn post_product(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Json<ProductCreatedResponse>, ApiError> {
    let mut form = read_multipart(multipart).await?;
    let manual = ManualProductForm {
        product_id: form.text.remove("product_id").unwrap_or_default(),
        name: form.text.remove("name").unwrap_or_default(),
        price: form.text.remove("price").unwrap_or_default(),
        description: form.text.remove("description"),
        image: form.image,
    };

    let entry = state.catalog.create_manual(manual).await?;
    Ok(Json(ProductCreatedResponse {
        success: true,
        message: "Product created successfully!".to_string(),
        product: entry.into(),
    }))
}

/// GET /v1/products/retrieve?session_id=...
///
/// Products referenced by the session's most recent turn.
pub async fn get_retrieve_products(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Query(query): Query<RetrieveQuery>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    let session_id = query
        .session_id
        .or_else(|| header_session(&headers))
        .unwrap_or_else(|| ANONYMOUS_SESSION.to_string());
    let retrieval = state.catalog.retrieve_for_session(&session_id).await?;
    Ok(Json(RetrieveResponse {
        message: retrieval.message,
        products: retrieval.products.into_iter().map(Into::into).collect(),
    }))
}

/// GET /health
///
/// Aggregates adapter health. Responds 503 when any adapter is unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let mut adapters = Vec::with_capacity(state.health.adapters.len());
    let mut overall = "ok";

    for adapter in &state.health.adapters {
        let (status, detail) = match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => ("healthy", None),
            Ok(HealthStatus::Degraded(reason)) => ("degraded", Some(reason)),
            Ok(HealthStatus::Unhealthy(reason)) => ("unhealthy", Some(reason)),
            Err(e) => ("unhealthy", Some(e.to_string())),
        };
        match status {
            "unhealthy" => overall = "unhealthy",
            "degraded" if overall == "ok" => overall = "degraded",
            _ => {}
        }
        adapters.push(AdapterHealth {
            name: adapter.name().to_string(),
            status,
            detail,
        });
    }

    let code = if overall == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let body = HealthResponse {
        status: overall,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        adapters,
    };
    (code, Json(body)).into_response()
}

fn product_list(entries: Vec<CatalogEntry>) -> ProductListResponse {
    ProductListResponse {
        products: entries.into_iter().map(Into::into).collect(),
    }
}

fn header_session(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Text fields and the optional `image` file of a multipart body.
struct MultipartForm {
    text: HashMap<String, String>,
    image: Option<ImageBlob>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, ShopError> {
    let mut form = MultipartForm {
        text: HashMap::new(),
        image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ShopError::Validation(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ShopError::Validation(format!("invalid image upload: {e}")))?;
            // Browsers send an empty part when no file was chosen.
            if !bytes.is_empty() {
                form.image = Some(ImageBlob {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ShopError::Validation(format!("invalid form field {name}: {e}")))?;
            form.text.insert(name, value);
        }
    }

    Ok(form)
}
