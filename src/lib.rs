//! Bookdesk
//!
//! Core of a book catalog dashboard: record stores (local JSON file or a
//! REST service), a read-through cache that refreshes itself after every
//! mutation, list filtering and pagination, and form validation. The
//! `bookdesk` binary serves the same REST surface the dashboard consumes.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn repository::RecordStore>,
}
