//! src/services/inventory_service.rs
//!
//! InventoryService — CRUD over the `inventory` table backed by SQLite for
//! records and local disk for photo payloads. Each operation is one
//! validation pass plus one query, with the photo store touched only on
//! create, photo replacement, and delete. File and row writes are not
//! transactional; cleanup is best effort and failures are logged rather
//! than surfaced.

use crate::models::item::InventoryItem;
use crate::services::photo_store::{PhotoStore, PhotoUpload};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::{io, path::PathBuf, sync::Arc};
use thiserror::Error;
use tokio::fs::File;
use tracing::warn;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory_name is required")]
    MissingName,
    #[error("at least one of inventory_name or description is required")]
    NoUpdateFields,
    #[error("a photo file is required")]
    MissingPhoto,
    #[error("unsupported upload content type `{0}`; only image/* is accepted")]
    NotAnImage(String),
    #[error("photo of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("Item with ID {0} not found")]
    ItemNotFound(String),
    #[error("No photo found for item with ID {0}")]
    PhotoNotFound(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

const ITEM_COLUMNS: &str = "id, inventory_name, description, photo_filename, created_at";

/// Aggregate counts served by `GET /stats`.
#[derive(Debug, Serialize)]
pub struct InventoryStats {
    pub total_items: i64,
    pub items_with_photos: i64,
    pub items_without_photos: i64,
    pub available_ids: Vec<i64>,
}

/// InventoryService provides the full item lifecycle:
/// - Register an item (optionally storing a photo first)
/// - List and fetch items
/// - Update name/description, replace the photo
/// - Delete an item together with its photo file
///
/// Identifiers reach this layer as the raw text taken from the request; a
/// value that does not parse as an integer behaves exactly like a missed
/// lookup, it never matches a row.
#[derive(Clone)]
pub struct InventoryService {
    /// Shared SQLite connection pool holding the `inventory` table.
    pub db: Arc<SqlitePool>,

    /// Directory of uploaded photo files.
    pub photos: PhotoStore,
}

impl InventoryService {
    pub fn new(db: Arc<SqlitePool>, photo_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            photos: PhotoStore::new(photo_dir),
        }
    }

    /// Register a new item. `inventory_name` is the only required field;
    /// the description defaults to an empty string.
    ///
    /// When a photo is attached it is stored before the row is inserted,
    /// and removed again if the insert fails.
    pub async fn register_item(
        &self,
        name: Option<String>,
        description: Option<String>,
        photo: Option<PhotoUpload>,
    ) -> InventoryResult<InventoryItem> {
        let name = supplied(name).ok_or(InventoryError::MissingName)?;
        let description = description.unwrap_or_default();

        let photo_filename = match photo {
            Some(upload) => Some(self.photos.save(&upload).await?),
            None => None,
        };

        let insert = sqlx::query_as::<_, InventoryItem>(&format!(
            "INSERT INTO inventory (inventory_name, description, photo_filename, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&name)
        .bind(&description)
        .bind(photo_filename.as_deref())
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match insert {
            Ok(item) => Ok(item),
            Err(err) => {
                if let Some(filename) = photo_filename.as_deref() {
                    if let Err(cleanup) = self.photos.delete(filename).await {
                        warn!("could not remove photo {} after failed insert: {}", filename, cleanup);
                    }
                }
                Err(InventoryError::Sqlx(err))
            }
        }
    }

    /// All items, ordered by id ascending.
    pub async fn list_items(&self) -> InventoryResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory ORDER BY id ASC"
        ))
        .fetch_all(&*self.db)
        .await?;
        Ok(items)
    }

    /// Fetch one item by its raw identifier text.
    pub async fn get_item(&self, id_raw: &str) -> InventoryResult<InventoryItem> {
        let id = parse_item_id(id_raw).ok_or_else(|| not_found(id_raw))?;

        sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => not_found(id_raw),
            other => InventoryError::Sqlx(other),
        })
    }

    /// Update name and/or description, returning the full updated record.
    ///
    /// Empty or whitespace-only values count as "not supplied"; supplying
    /// neither field is a validation error. Only the supplied fields change.
    pub async fn update_item(
        &self,
        id_raw: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> InventoryResult<InventoryItem> {
        let name = supplied(name);
        let description = supplied(description);
        if name.is_none() && description.is_none() {
            return Err(InventoryError::NoUpdateFields);
        }

        let id = parse_item_id(id_raw).ok_or_else(|| not_found(id_raw))?;

        sqlx::query_as::<_, InventoryItem>(&format!(
            "UPDATE inventory
             SET inventory_name = COALESCE(?, inventory_name),
                 description    = COALESCE(?, description)
             WHERE id = ?
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| not_found(id_raw))
    }

    /// Replace an item's photo: validate the new upload, drop the old file,
    /// store the new one, then point the row at it.
    ///
    /// The old file's removal is best effort. If the row vanished between
    /// lookup and update the freshly stored file is removed again.
    pub async fn replace_photo(
        &self,
        id_raw: &str,
        upload: PhotoUpload,
    ) -> InventoryResult<InventoryItem> {
        let item = self.get_item(id_raw).await?;
        self.photos.ensure_acceptable(&upload)?;

        if let Some(old) = item.photo_filename.as_deref() {
            if let Err(err) = self.photos.delete(old).await {
                warn!("could not remove replaced photo {}: {}", old, err);
            }
        }

        let filename = self.photos.save(&upload).await?;

        let update = sqlx::query("UPDATE inventory SET photo_filename = ? WHERE id = ?")
            .bind(&filename)
            .bind(item.id)
            .execute(&*self.db)
            .await;

        match update {
            Ok(result) if result.rows_affected() > 0 => Ok(InventoryItem {
                photo_filename: Some(filename),
                ..item
            }),
            Ok(_) => {
                let _ = self.photos.delete(&filename).await;
                Err(not_found(id_raw))
            }
            Err(err) => {
                let _ = self.photos.delete(&filename).await;
                Err(InventoryError::Sqlx(err))
            }
        }
    }

    /// Delete an item, returning the removed record.
    ///
    /// The photo file, if any, is removed after the row; a failure there is
    /// logged and the delete still succeeds.
    pub async fn delete_item(&self, id_raw: &str) -> InventoryResult<InventoryItem> {
        let id = parse_item_id(id_raw).ok_or_else(|| not_found(id_raw))?;

        let removed = sqlx::query_as::<_, InventoryItem>(&format!(
            "DELETE FROM inventory WHERE id = ? RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| not_found(id_raw))?;

        if let Some(filename) = removed.photo_filename.as_deref() {
            if let Err(err) = self.photos.delete(filename).await {
                warn!(
                    "could not remove photo {} for deleted item {}: {}",
                    filename, removed.id, err
                );
            }
        }

        Ok(removed)
    }

    /// Open an item's photo for streaming out.
    ///
    /// Returns the item, the opened file, and its length. A record without a
    /// photo, or one whose file has gone missing (a delete can race a read),
    /// reports the photo as not found.
    pub async fn photo_reader(&self, id_raw: &str) -> InventoryResult<(InventoryItem, File, u64)> {
        let item = self.get_item(id_raw).await?;
        let Some(filename) = item.photo_filename.clone() else {
            return Err(InventoryError::PhotoNotFound(item.id.to_string()));
        };

        match self.photos.open(&filename).await {
            Ok((file, len)) => Ok((item, file, len)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(InventoryError::PhotoNotFound(item.id.to_string()))
            }
            Err(err) => Err(InventoryError::Io(err)),
        }
    }

    /// Aggregate counts over the whole table.
    pub async fn stats(&self) -> InventoryResult<InventoryStats> {
        let rows: Vec<(i64, Option<String>)> =
            sqlx::query_as("SELECT id, photo_filename FROM inventory ORDER BY id ASC")
                .fetch_all(&*self.db)
                .await?;

        let total_items = rows.len() as i64;
        let items_with_photos = rows.iter().filter(|(_, photo)| photo.is_some()).count() as i64;

        Ok(InventoryStats {
            total_items,
            items_with_photos,
            items_without_photos: total_items - items_with_photos,
            available_ids: rows.into_iter().map(|(id, _)| id).collect(),
        })
    }
}

/// Best-effort integer coercion for client-supplied identifiers.
fn parse_item_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn not_found(id_raw: &str) -> InventoryError {
    InventoryError::ItemNotFound(id_raw.trim().to_string())
}

/// Treat empty and whitespace-only strings as absent.
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
