//! Record stores for book persistence

pub mod local;
pub mod remote;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{Book, BookDraft, BookPatch},
};

pub use local::LocalStore;
pub use remote::RemoteStore;

/// Key-value persistence of book records.
///
/// Every mutating call performs a durable write (a network round-trip or a
/// persisted local file) before returning. Failures are handed straight back
/// to the caller; no retry happens at this layer. Books returned from a store
/// always carry a usable display image reference.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All books, in store order
    async fn list(&self) -> AppResult<Vec<Book>>;

    /// One book, or `NotFound`
    async fn get(&self, id: &str) -> AppResult<Book>;

    /// Persist a draft; the store assigns the id
    async fn create(&self, draft: &BookDraft) -> AppResult<Book>;

    /// Merge `patch` into an existing book, or `NotFound`
    async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<Book>;

    /// Remove a book, or `NotFound`
    async fn delete(&self, id: &str) -> AppResult<()>;
}
