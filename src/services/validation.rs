//! Book form state and field validation

use std::collections::BTreeMap;
use validator::Validate;

use crate::models::{
    book::{Book, BookDraft, BookStatus},
    image,
};

/// Field name → message. Empty when the form is valid.
pub type FieldErrors = BTreeMap<String, String>;

/// Validate a draft: title and author must contain something other than whitespace
pub fn validate_draft(draft: &BookDraft) -> FieldErrors {
    match draft.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.to_string(), message)
                })
            })
            .collect(),
    }
}

/// Editable book form used for both adding and editing a book.
///
/// Until the first submit no errors are shown. After it, each setter
/// re-checks its own field, so an error disappears as soon as the field is
/// fixed (and comes back if it is emptied again).
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    title: String,
    author: String,
    genre: String,
    year: Option<i32>,
    status: BookStatus,
    image_url: String,
    errors: FieldErrors,
    submitted: bool,
}

impl BookForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing book. A derived placeholder image is
    /// left out so that saving the form does not store it.
    pub fn from_book(book: &Book) -> Self {
        let placeholder = image::placeholder_url(&book.title, book.genre.as_deref());
        let image_url = book
            .image_url
            .as_deref()
            .filter(|url| url.trim() != placeholder)
            .unwrap_or_default()
            .to_string();

        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone().unwrap_or_default(),
            year: book.year,
            status: book.status,
            image_url,
            ..Self::default()
        }
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.revalidate("title");
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
        self.revalidate("author");
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.genre = genre.into();
    }

    pub fn set_status(&mut self, status: BookStatus) {
        self.status = status;
    }

    pub fn set_image_url(&mut self, image_url: impl Into<String>) {
        self.image_url = image_url.into();
    }

    /// Numeric input for the year. Empty input clears it; anything that is not
    /// an integer is refused and the previous value kept.
    pub fn set_year_input(&mut self, input: &str) -> bool {
        let input = input.trim();
        if input.is_empty() {
            self.year = None;
            return true;
        }
        match input.parse::<i32>() {
            Ok(year) => {
                self.year = Some(year);
                true
            }
            Err(_) => false,
        }
    }

    /// The draft this form currently describes. Blank optional fields become absent.
    pub fn draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: non_blank(&self.genre),
            year: self.year,
            status: self.status,
            image_url: non_blank(&self.image_url),
        }
    }

    /// Validation errors for the current field values
    pub fn validate(&self) -> FieldErrors {
        validate_draft(&self.draft())
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Validate everything. Returns the draft when valid; otherwise the
    /// errors are recorded on the form and submission is blocked.
    pub fn submit(&mut self) -> Result<BookDraft, FieldErrors> {
        self.submitted = true;
        self.errors = self.validate();
        if self.errors.is_empty() {
            Ok(self.draft())
        } else {
            Err(self.errors.clone())
        }
    }

    fn revalidate(&mut self, field: &str) {
        if !self.submitted {
            return;
        }
        match self.validate().remove(field) {
            Some(message) => {
                self.errors.insert(field.to_string(), message);
            }
            None => {
                self.errors.remove(field);
            }
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    match value.trim() {
        "" => None,
        trimmed => Some(trimmed.to_string()),
    }
}
