//! Core data models for the inventory tracking service.
//!
//! `InventoryItem` is the stored record and maps to the `inventory` table
//! via `sqlx::FromRow`. `ItemRepresentation` is the client-facing shape
//! derived from it; the stored photo filename never leaves the process,
//! only the derived photo URL does.

pub mod item;
