pub mod app;
pub mod auth_handlers;
pub mod config;
pub mod credentials;
pub mod error;
pub mod franchise_handlers;
pub mod order_handlers;
pub mod store;
pub mod user_handlers;

pub use app::{router, AppState};
