//! HTTP handlers for the inventory surface.
//!
//! Registration and photo replacement accept multipart bodies, field
//! updates arrive as JSON, search as an urlencoded form. Photo downloads
//! stream straight from disk. Everything else is delegated to
//! `InventoryService`.
//!
//! Body extractors are taken as `Result` so malformed payloads (bad JSON,
//! wrong content type, broken multipart boundary) come back through the
//! same `{"error": ...}` body as every other failure instead of axum's
//! plain-text rejections.

use crate::{
    errors::AppError,
    models::item::ItemRepresentation,
    services::{
        inventory_service::{InventoryError, InventoryService, InventoryStats},
        photo_store::{self, PhotoUpload},
    },
};
use axum::{
    Form, Json,
    body::Body,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;

/// JSON body accepted by `PUT /inventory/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub inventory_name: Option<String>,
    pub description: Option<String>,
}

/// Form body accepted by `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "includePhoto")]
    pub include_photo: Option<String>,
}

/// GET `/inventory` — every item, ordered by id.
pub async fn list_items(
    State(service): State<InventoryService>,
) -> Result<Json<Vec<ItemRepresentation>>, AppError> {
    let items = service.list_items().await?;
    Ok(Json(
        items.iter().map(|item| item.to_representation(false)).collect(),
    ))
}

/// GET `/inventory/{id}` — one item.
pub async fn get_item(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<Json<ItemRepresentation>, AppError> {
    let item = service.get_item(&id).await?;
    Ok(Json(item.to_representation(false)))
}

/// GET `/inventory/{id}/photo` — raw photo bytes as a streaming response.
pub async fn get_photo(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (item, file, len) = service.photo_reader(&id).await?;
    let mime = item
        .photo_filename
        .as_deref()
        .map(photo_store::mime_type_for)
        .unwrap_or("image/jpeg");

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&len.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    Ok(response)
}

/// POST `/register` — create an item from a multipart form
/// (`inventory_name`, `description`, optional `photo`).
pub async fn register_item(
    State(service): State<InventoryService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let mut multipart = multipart.map_err(bad_body)?;
    let mut inventory_name = None;
    let mut description = None;
    let mut photo = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "inventory_name" => inventory_name = Some(field.text().await.map_err(bad_multipart)?),
            "description" => description = Some(field.text().await.map_err(bad_multipart)?),
            "photo" => photo = read_photo_field(field).await?,
            _ => {}
        }
    }

    let item = service
        .register_item(inventory_name, description, photo)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Item registered successfully",
            "id": item.id,
            "item": item.to_representation(false),
        })),
    ))
}

/// PUT `/inventory/{id}` — update name and/or description.
pub async fn update_item(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(payload) = payload.map_err(bad_body)?;
    let item = service
        .update_item(&id, payload.inventory_name, payload.description)
        .await?;
    Ok(Json(json!({
        "message": "Item updated successfully",
        "item": item.to_representation(false),
    })))
}

/// PUT `/inventory/{id}/photo` — replace the photo from a multipart form.
pub async fn replace_photo(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut multipart = multipart.map_err(bad_body)?;
    let mut photo = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("photo") {
            photo = read_photo_field(field).await?;
        }
    }

    let upload = photo.ok_or(InventoryError::MissingPhoto)?;
    service.replace_photo(&id, upload).await?;
    Ok(Json(json!({ "message": "Photo updated successfully" })))
}

/// DELETE `/inventory/{id}` — remove the item and its photo file.
pub async fn delete_item(
    State(service): State<InventoryService>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let item = service.delete_item(&id).await?;
    Ok(Json(json!({
        "message": format!("Item with ID {} deleted successfully", item.id),
    })))
}

/// POST `/search` — look an item up by id; `includePhoto` folds the photo
/// reference into the returned description.
pub async fn search_item(
    State(service): State<InventoryService>,
    form: Result<Form<SearchRequest>, FormRejection>,
) -> Result<Json<ItemRepresentation>, AppError> {
    let Form(form) = form.map_err(bad_body)?;
    let include_photo = form.include_photo.as_deref().is_some_and(is_truthy);
    let item = service.get_item(&form.id).await?;
    Ok(Json(item.to_representation(include_photo)))
}

/// GET `/stats` — aggregate counts.
pub async fn get_stats(
    State(service): State<InventoryService>,
) -> Result<Json<InventoryStats>, AppError> {
    Ok(Json(service.stats().await?))
}

/// Pull a photo payload out of its multipart field.
///
/// A part with no filename and no bytes is what browsers submit for an
/// untouched file input; it counts as "no photo".
async fn read_photo_field(field: Field<'_>) -> Result<Option<PhotoUpload>, AppError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.is_empty());
    let content_type = field.content_type().map(str::to_string);
    let data = field.bytes().await.map_err(bad_multipart)?;

    if file_name.is_none() && data.is_empty() {
        return Ok(None);
    }

    Ok(Some(PhotoUpload {
        data,
        file_name,
        content_type,
    }))
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::bad_request(format!("invalid multipart request: {err}"))
}

/// Extractor rejections (axum would answer these in plain text) become a
/// 400 in the standard envelope; their display text already names the
/// problem.
fn bad_body<R: std::fmt::Display>(rejection: R) -> AppError {
    AppError::bad_request(rejection.to_string())
}

/// Checkbox-style truthiness for form flags.
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
