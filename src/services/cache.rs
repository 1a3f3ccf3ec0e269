//! Cache and mutation coordinator for the book list.
//!
//! `BookCache` owns the only in-memory copy of the catalog. Reads go through
//! [`BookCache::query`], which serves the cached list while it is fresh and
//! otherwise fetches it from the record store. Writes go through
//! [`BookCache::mutate`]: the store call runs first, and only after it has
//! succeeded is the cache marked stale and re-fetched. The coordinator never
//! patches its copy in place, so what it serves is always a list the store
//! actually returned.
//!
//! A failed mutation leaves the cache untouched and produces exactly one error
//! notice, so retrying by hand is always safe.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};

use super::notify::{MutationKind, Notice, Notifier};
use crate::{
    error::AppResult,
    models::book::{Book, BookDraft, BookPatch},
    repository::RecordStore,
};

/// Whether the cached list may be served without asking the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Stale,
    Fresh,
}

struct CachedBooks {
    books: Arc<Vec<Book>>,
    freshness: Freshness,
}

/// A write intent against the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(BookDraft),
    Update { id: String, patch: BookPatch },
    Delete(String),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Update { .. } => MutationKind::Update,
            Mutation::Delete(_) => MutationKind::Delete,
        }
    }
}

/// What a successful mutation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Created(Book),
    Updated(Book),
    Deleted(String),
}

/// Keeps a mutation kind marked in flight until dropped
struct PendingGuard<'a>(&'a AtomicUsize);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct BookCache {
    store: Arc<dyn RecordStore>,
    cached: Mutex<CachedBooks>,
    pending: [AtomicUsize; 3],
    notifier: Notifier,
    updates: watch::Sender<Arc<Vec<Book>>>,
}

impl BookCache {
    /// A cache over `store` that starts empty and stale
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_notifier(store, Notifier::default())
    }

    pub fn with_notifier(store: Arc<dyn RecordStore>, notifier: Notifier) -> Self {
        let empty = Arc::new(Vec::new());
        let (updates, _) = watch::channel(empty.clone());
        Self {
            store,
            cached: Mutex::new(CachedBooks {
                books: empty,
                freshness: Freshness::Stale,
            }),
            pending: Default::default(),
            notifier,
            updates,
        }
    }

    /// Read-through query of the full list.
    ///
    /// The cache lock is held across the fetch, so callers arriving while a
    /// fetch is in flight wait for it and then get its result.
    pub async fn query(&self) -> AppResult<Arc<Vec<Book>>> {
        let mut cached = self.cached.lock().await;
        if cached.freshness == Freshness::Fresh {
            return Ok(cached.books.clone());
        }
        self.fetch_into(&mut cached).await
    }

    async fn fetch_into(&self, cached: &mut CachedBooks) -> AppResult<Arc<Vec<Book>>> {
        let books = self
            .store
            .list()
            .await
            .inspect_err(|e| tracing::error!("Error fetching books: {}", e))?;
        let books = Arc::new(books);

        cached.books = books.clone();
        cached.freshness = Freshness::Fresh;
        self.updates.send_replace(books.clone());

        tracing::debug!("Book cache refreshed with {} books", books.len());
        Ok(books)
    }

    /// Apply a mutation to the store, then refresh the cache before returning
    pub async fn mutate(&self, mutation: Mutation) -> AppResult<MutationOutcome> {
        match mutation {
            Mutation::Create(draft) => self.create(draft).await.map(MutationOutcome::Created),
            Mutation::Update { id, patch } => {
                self.update(id, patch).await.map(MutationOutcome::Updated)
            }
            Mutation::Delete(id) => {
                self.delete(id.clone()).await?;
                Ok(MutationOutcome::Deleted(id))
            }
        }
    }

    pub async fn create(&self, draft: BookDraft) -> AppResult<Book> {
        self.run(MutationKind::Create, self.store.create(&draft)).await
    }

    pub async fn update(&self, id: impl Into<String>, patch: BookPatch) -> AppResult<Book> {
        let id = id.into();
        self.run(MutationKind::Update, self.store.update(&id, &patch)).await
    }

    pub async fn delete(&self, id: impl Into<String>) -> AppResult<()> {
        let id = id.into();
        self.run(MutationKind::Delete, self.store.delete(&id)).await
    }

    /// Drive one store call. On success the cache is refreshed before the
    /// success notice goes out; on failure the cache is left as it was.
    async fn run<T>(
        &self,
        kind: MutationKind,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        let _pending = self.begin(kind);

        let value = match call.await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("{:?} mutation failed: {}", kind, e);
                self.notifier.failure(kind, &e);
                return Err(e);
            }
        };

        self.refresh().await;
        self.notifier.success(kind);
        Ok(value)
    }

    /// Mark the cache stale and re-fetch. A failed fetch leaves it stale so
    /// the next `query` tries again.
    async fn refresh(&self) {
        let mut cached = self.cached.lock().await;
        cached.freshness = Freshness::Stale;
        if let Err(e) = self.fetch_into(&mut cached).await {
            tracing::warn!("Book cache left stale after mutation: {}", e);
        }
    }

    /// Force the next `query` to hit the store
    pub async fn invalidate(&self) {
        self.cached.lock().await.freshness = Freshness::Stale;
    }

    pub async fn freshness(&self) -> Freshness {
        self.cached.lock().await.freshness
    }

    /// Last list published by a successful fetch, without waiting on one in flight
    pub fn snapshot(&self) -> Arc<Vec<Book>> {
        self.updates.borrow().clone()
    }

    /// Receives every list published after a successful fetch
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Book>>> {
        self.updates.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    /// Whether a mutation of this kind is currently in flight
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.pending[slot(kind)].load(Ordering::SeqCst) > 0
    }

    fn begin(&self, kind: MutationKind) -> PendingGuard<'_> {
        let counter = &self.pending[slot(kind)];
        counter.fetch_add(1, Ordering::SeqCst);
        PendingGuard(counter)
    }
}

fn slot(kind: MutationKind) -> usize {
    match kind {
        MutationKind::Create => 0,
        MutationKind::Update => 1,
        MutationKind::Delete => 2,
    }
}
