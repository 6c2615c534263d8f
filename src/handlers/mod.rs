pub mod health_handlers;
pub mod inventory_handlers;
