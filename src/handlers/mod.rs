//! HTTP handlers for the sync server.

pub mod auth;
pub mod catalog;
pub mod status;

pub use auth::{login, pair_check, verify_token};
pub use catalog::{get_dine_categories, get_dine_tables, get_items, get_user_settings};
pub use status::get_status;
