//! Inventory tracking HTTP service.
//!
//! Clients register items (name, description, optional photo), list and
//! look them up, update metadata and photos, delete them, and search by
//! identifier. Records live in one SQLite table; photos live in a flat
//! directory addressed by generated filenames.

pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
