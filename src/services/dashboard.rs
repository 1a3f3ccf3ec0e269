//! Dashboard state: the cached catalog plus the list view over it.
//!
//! Consumers re-read [`Dashboard::view`] after every mutation completes;
//! there is no implicit re-rendering. Each call goes through the cache, so it
//! costs nothing while the list is fresh.

use std::sync::Arc;

use super::{
    cache::BookCache,
    listing::{self, GenreFilter, ListState, Page, StatusFilter},
    validation::BookForm,
};
use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::book::{Book, BookPatch},
    repository::RemoteStore,
};

pub struct Dashboard {
    cache: Arc<BookCache>,
    list: ListState,
    page_size: usize,
}

impl Dashboard {
    pub fn new(cache: Arc<BookCache>, page_size: usize) -> Self {
        Self {
            cache,
            list: ListState::new(),
            page_size: page_size.max(1),
        }
    }

    /// Dashboard talking to the REST service named in the configuration
    pub fn connect(config: &AppConfig) -> AppResult<Self> {
        let store = RemoteStore::new(&config.api.base_url)?;
        tracing::info!("Dashboard using book service at {}", store.base_url());
        let cache = Arc::new(BookCache::new(Arc::new(store)));
        Ok(Self::new(cache, config.listing.page_size))
    }

    pub fn cache(&self) -> &Arc<BookCache> {
        &self.cache
    }

    pub fn list_state(&self) -> &ListState {
        &self.list
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The page to display right now. When the list has shrunk under the
    /// current page (after a delete, say), the page is pulled back to the last one.
    pub async fn view(&mut self) -> AppResult<Page> {
        let books = self.cache.query().await?;
        let page = listing::derive_page(&books, &self.list, self.page_size);
        if page.page <= page.total_pages.max(1) {
            return Ok(page);
        }
        self.list.go_to(page.page, page.total_pages);
        Ok(listing::derive_page(&books, &self.list, self.page_size))
    }

    /// Genres present in the catalog, for the genre filter
    pub async fn genre_options(&self) -> AppResult<Vec<String>> {
        let books = self.cache.query().await?;
        Ok(listing::genres(&books))
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.list.set_search(search);
    }

    pub fn set_genre(&mut self, genre: GenreFilter) {
        self.list.set_genre(genre);
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.list.set_status(status);
    }

    pub async fn next_page(&mut self) -> AppResult<()> {
        let total = self.view().await?.total_pages;
        self.list.next_page(total);
        Ok(())
    }

    pub fn prev_page(&mut self) {
        self.list.prev_page();
    }

    pub async fn go_to_page(&mut self, page: usize) -> AppResult<()> {
        let total = self.view().await?.total_pages;
        self.list.go_to(page, total);
        Ok(())
    }

    /// Submit a form: create a book, or replace the fields of `editing`.
    /// Invalid forms never reach the store.
    pub async fn save(&self, form: &mut BookForm, editing: Option<&str>) -> AppResult<Book> {
        let draft = form.submit().map_err(|errors| {
            AppError::Validation(errors.into_values().collect::<Vec<_>>().join(", "))
        })?;

        match editing {
            Some(id) => self.cache.update(id, BookPatch::from(draft)).await,
            None => self.cache.create(draft).await,
        }
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.cache.delete(id).await
    }
}
