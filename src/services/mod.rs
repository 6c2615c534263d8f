pub mod inventory_service;
pub mod photo_store;
