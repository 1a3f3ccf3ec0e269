//! Local record store backed by a JSON file

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDraft, BookPatch},
};

/// Book store kept in memory and, when a path is configured, mirrored to a
/// JSON array file after every mutation.
///
/// Records are persisted exactly as submitted; display images are derived
/// only when books are read back out.
pub struct LocalStore {
    path: Option<PathBuf>,
    books: Mutex<Vec<Book>>,
}

impl LocalStore {
    /// Store with no backing file
    pub fn in_memory() -> Self {
        Self {
            path: None,
            books: Mutex::new(Vec::new()),
        }
    }

    /// Open (or start) the store backed by `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let books = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice::<Vec<Book>>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Opened local store {} with {} books", path.display(), books.len());

        Ok(Self {
            path: Some(path),
            books: Mutex::new(books),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert `drafts` when the store holds no books yet. Returns how many were added.
    pub async fn seed_if_empty(&self, drafts: &[BookDraft]) -> AppResult<usize> {
        let mut books = self.books.lock().await;
        if !books.is_empty() {
            return Ok(0);
        }

        let seeded: Vec<Book> = drafts
            .iter()
            .map(|draft| Book::from_draft(new_id(), draft))
            .collect();
        self.persist(&seeded).await?;
        *books = seeded;

        tracing::info!("Seeded local store with {} books", books.len());
        Ok(books.len())
    }

    /// Write the full record set, replacing the file atomically
    async fn persist(&self, books: &[Book]) -> AppResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(books)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        let books = self.books.lock().await;
        Ok(books.iter().cloned().map(Book::with_display_image).collect())
    }

    async fn get(&self, id: &str) -> AppResult<Book> {
        let books = self.books.lock().await;
        books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .map(Book::with_display_image)
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, draft: &BookDraft) -> AppResult<Book> {
        let mut books = self.books.lock().await;
        let book = Book::from_draft(new_id(), draft);

        let mut next = books.clone();
        next.push(book.clone());
        self.persist(&next).await?;
        *books = next;

        tracing::debug!("Created book {}", book.id);
        Ok(book.with_display_image())
    }

    async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<Book> {
        let mut books = self.books.lock().await;
        let index = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| not_found(id))?;

        let mut next = books.clone();
        next[index].apply(patch);
        let book = next[index].clone();
        self.persist(&next).await?;
        *books = next;

        tracing::debug!("Updated book {}", id);
        Ok(book.with_display_image())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut books = self.books.lock().await;
        if !books.iter().any(|b| b.id == id) {
            return Err(not_found(id));
        }

        let next: Vec<Book> = books.iter().filter(|b| b.id != id).cloned().collect();
        self.persist(&next).await?;
        *books = next;

        tracing::debug!("Deleted book {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::book::BookStatus;

    fn draft(title: &str, author: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let store = LocalStore::in_memory();
        let a = store.create(&draft("Dune", "Herbert")).await.unwrap();
        let b = store.create(&draft("Dune", "Herbert")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_preserves_id_and_merges() {
        let store = LocalStore::in_memory();
        let created = store.create(&draft("Dune", "Herbert")).await.unwrap();

        let patch = BookPatch {
            status: Some(BookStatus::Issued),
            ..Default::default()
        };
        let updated = store.update(&created.id, &patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Dune");
        assert_eq!(updated.status, BookStatus::Issued);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let store = LocalStore::in_memory();
        let err = store.get("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store.update("nope", &BookPatch::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store.delete("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let store = LocalStore::in_memory();
        let book = store.create(&draft("Emma", "Austen")).await.unwrap();

        store.delete(&book.id).await.unwrap();
        let err = store.delete(&book.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_placeholder_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        let store = LocalStore::open(&path).await.unwrap();

        let book = store.create(&draft("Dune", "Herbert")).await.unwrap();
        assert!(book.image_url.is_some());

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(raw[0].get("imageUrl").is_none());
    }

    #[tokio::test]
    async fn test_reopen_restores_books() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("books.json");

        let id = {
            let store = LocalStore::open(&path).await.unwrap();
            store.create(&draft("Emma", "Austen")).await.unwrap().id
        };

        let store = LocalStore::open(&path).await.unwrap();
        let book = store.get(&id).await.unwrap();
        assert_eq!(book.title, "Emma");
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("books.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();
        let store = LocalStore {
            path: Some(path),
            books: Mutex::new(Vec::new()),
        };

        let err = store.create(&draft("Dune", "Herbert")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = LocalStore::in_memory();
        let drafts = vec![draft("Dune", "Herbert"), draft("Emma", "Austen")];

        assert_eq!(store.seed_if_empty(&drafts).await.unwrap(), 2);
        assert_eq!(store.seed_if_empty(&drafts).await.unwrap(), 0);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
