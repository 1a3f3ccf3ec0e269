//! Transport client: the record store behind the REST API
//!
//! Maps store operations to `GET/POST /books` and `GET/PUT/DELETE /books/{id}`
//! and normalizes every book it hands back so that it carries a usable image
//! reference.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDraft, BookPatch},
};

#[derive(Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: Url,
}

impl RemoteStore {
    /// Client for the service at `base_url` (e.g. `http://localhost:3001`)
    pub fn new(base_url: &str) -> AppResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::BadRequest(format!("Invalid API base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::BadRequest(format!(
                "Invalid API base URL {}",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn books_url(&self) -> Url {
        self.url_for(&["books"])
    }

    fn book_url(&self, id: &str) -> Url {
        self.url_for(&["books", id])
    }

    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Turn a non-success response into the matching error
    async fn check(response: Response, id: Option<&str>) -> AppResult<Response> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(AppError::NotFound(match id {
                Some(id) => format!("Book {} not found", id),
                None => "Books resource not found".to_string(),
            })),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::BadRequest(server_message(&body)))
            }
            status => match response.error_for_status() {
                Err(e) => Err(e.into()),
                Ok(_) => Err(AppError::Internal(format!("Unexpected response status {}", status))),
            },
        }
    }
}

/// Pull the `message` out of a JSON error body, falling back to the raw text
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl RecordStore for RemoteStore {
    async fn list(&self) -> AppResult<Vec<Book>> {
        tracing::debug!("Fetching books");
        let response = self
            .client
            .get(self.books_url())
            .send()
            .await
            .inspect_err(|e| tracing::error!("Error fetching books: {}", e))?;
        let books: Vec<Book> = Self::check(response, None).await?.json().await?;
        Ok(books.into_iter().map(Book::with_display_image).collect())
    }

    async fn get(&self, id: &str) -> AppResult<Book> {
        tracing::debug!("Fetching book {}", id);
        let response = self
            .client
            .get(self.book_url(id))
            .send()
            .await
            .inspect_err(|e| tracing::error!("Error fetching book {}: {}", id, e))?;
        let book: Book = Self::check(response, Some(id)).await?.json().await?;
        Ok(book.with_display_image())
    }

    async fn create(&self, draft: &BookDraft) -> AppResult<Book> {
        tracing::debug!("Creating book {:?}", draft.title);
        let response = self
            .client
            .post(self.books_url())
            .json(draft)
            .send()
            .await
            .inspect_err(|e| tracing::error!("Error creating book: {}", e))?;
        let book: Book = Self::check(response, None).await?.json().await?;
        Ok(book.with_display_image())
    }

    async fn update(&self, id: &str, patch: &BookPatch) -> AppResult<Book> {
        tracing::debug!("Updating book {}", id);
        let response = self
            .client
            .put(self.book_url(id))
            .json(patch)
            .send()
            .await
            .inspect_err(|e| tracing::error!("Error updating book {}: {}", id, e))?;
        let book: Book = Self::check(response, Some(id)).await?.json().await?;
        Ok(book.with_display_image())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        tracing::debug!("Deleting book {}", id);
        let response = self
            .client
            .delete(self.book_url(id))
            .send()
            .await
            .inspect_err(|e| tracing::error!("Error deleting book {}: {}", id, e))?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
