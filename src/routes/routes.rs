//! Defines routes for the inventory tracking API.
//!
//! ## Structure
//! - **Item endpoints**
//!   - `GET    /inventory` — list all items
//!   - `GET    /inventory/{id}` — fetch one item
//!   - `PUT    /inventory/{id}` — update name/description (JSON)
//!   - `DELETE /inventory/{id}` — delete item and its photo
//!
//! - **Photo endpoints**
//!   - `GET /inventory/{id}/photo` — download the raw photo bytes
//!   - `PUT /inventory/{id}/photo` — replace the photo (multipart)
//!
//! - **Collection endpoints**
//!   - `POST /register` — create an item (multipart)
//!   - `POST /search` — find one item by id (form-encoded)
//!   - `GET  /stats` — aggregate counts
//!
//! Identifier segments are taken as raw text; values that do not parse as
//! integers simply never match a row.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        inventory_handlers::{
            delete_item, get_item, get_photo, get_stats, list_items, register_item, replace_photo,
            search_item, update_item,
        },
    },
    services::{inventory_service::InventoryService, photo_store::MAX_PHOTO_BYTES},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build and return the router for the whole inventory API.
///
/// The router carries shared state (`InventoryService`) to all handlers.
/// The transport body cap sits above the per-photo cap so oversized uploads
/// reach the photo store's own size check instead of dying in the extractor.
pub fn routes() -> Router<InventoryService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Item endpoints
        .route("/inventory", get(list_items))
        .route(
            "/inventory/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/inventory/{id}/photo", get(get_photo).put(replace_photo))
        // Collection endpoints
        .route("/register", post(register_item))
        .route("/search", post(search_item))
        .route("/stats", get(get_stats))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + 1024 * 1024))
}
