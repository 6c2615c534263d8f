//! The inventory record and its client-facing representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single row in the `inventory` table.
///
/// The record keeps the photo *filename*; clients only ever see the derived
/// photo URL (see [`ItemRepresentation`]).
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct InventoryItem {
    /// Storage-assigned identifier. Monotonic, never reused after deletion.
    pub id: i64,

    /// Item name. The only required field at registration.
    pub inventory_name: String,

    /// Free-form description. Defaults to the empty string.
    pub description: String,

    /// Name of the stored photo file, when a photo is attached.
    pub photo_filename: Option<String>,

    /// When the item was registered.
    pub created_at: DateTime<Utc>,
}

/// The JSON shape returned to clients.
///
/// `photo_url` is serialized as `null` when no photo is attached, never
/// omitted.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ItemRepresentation {
    pub id: i64,
    pub inventory_name: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Derived photo URL: present iff a photo filename is stored.
    pub fn photo_url(&self) -> Option<String> {
        self.photo_filename
            .as_ref()
            .map(|_| format!("/inventory/{}/photo", self.id))
    }

    /// Map the record to its client-facing representation.
    ///
    /// With `include_photo_in_description` set and a photo attached, a
    /// bracketed reference to the photo URL is appended to the description
    /// in the response only; the stored description is untouched.
    pub fn to_representation(&self, include_photo_in_description: bool) -> ItemRepresentation {
        let photo_url = self.photo_url();

        let description = match photo_url.as_deref() {
            Some(url) if include_photo_in_description => {
                if self.description.is_empty() {
                    format!("[photo: {url}]")
                } else {
                    format!("{} [photo: {url}]", self.description)
                }
            }
            _ => self.description.clone(),
        };

        ItemRepresentation {
            id: self.id,
            inventory_name: self.inventory_name.clone(),
            description,
            photo_url,
            created_at: self.created_at,
        }
    }
}
