//! Data models for Bookdesk

pub mod book;
pub mod image;

// Re-export commonly used types
pub use book::{Book, BookDraft, BookPatch, BookStatus};
