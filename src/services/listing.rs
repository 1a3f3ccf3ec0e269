//! Derivation of the visible page from the full book list

use crate::models::book::{Book, BookStatus};

/// Books shown per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Genre filter: everything, or one exact genre
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Genre(String),
}

impl GenreFilter {
    fn matches(&self, book: &Book) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Genre(genre) => book.genre.as_deref() == Some(genre.as_str()),
        }
    }
}

/// Status filter: everything, or one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookStatus),
}

impl StatusFilter {
    fn matches(&self, book: &Book) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => book.status == *status,
        }
    }
}

/// One page of the filtered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub books: Vec<Book>,
    /// Current page, 1-based
    pub page: usize,
    pub total_pages: usize,
    /// Books matching the filters across all pages
    pub total_matches: usize,
}

fn matches_search(book: &Book, needle: &str) -> bool {
    needle.is_empty()
        || book.title.to_lowercase().contains(needle)
        || book.author.to_lowercase().contains(needle)
}

/// Books whose title or author contains `search` (case-insensitive) and that
/// pass both filters, in their original order.
pub fn filter_books(
    books: &[Book],
    search: &str,
    genre: &GenreFilter,
    status: StatusFilter,
) -> Vec<Book> {
    let needle = search.to_lowercase();
    books
        .iter()
        .filter(|b| matches_search(b, &needle) && genre.matches(b) && status.matches(b))
        .cloned()
        .collect()
}

/// Number of pages needed for `count` items; zero items means zero pages
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Filter `books` with `state` and cut out the requested page.
/// Pages past the end come back empty; page 0 is read as page 1.
pub fn derive_page(books: &[Book], state: &ListState, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let filtered = filter_books(books, &state.search, &state.genre, state.status);
    let page = state.page.max(1);

    let start = (page - 1).saturating_mul(page_size);
    let slice = filtered
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    Page {
        books: slice,
        page,
        total_pages: total_pages(filtered.len(), page_size),
        total_matches: filtered.len(),
    }
}

/// Distinct genres in first-seen order, for the genre filter options
pub fn genres(books: &[Book]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for genre in books.iter().filter_map(|b| b.genre.as_ref()) {
        if !seen.contains(genre) {
            seen.push(genre.clone());
        }
    }
    seen
}

/// Search text, filters and current page of the list view.
///
/// Changing the search text or either filter puts the view back on page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    search: String,
    genre: GenreFilter,
    status: StatusFilter,
    page: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            search: String::new(),
            genre: GenreFilter::All,
            status: StatusFilter::All,
            page: 1,
        }
    }
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn genre(&self) -> &GenreFilter {
        &self.genre
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_genre(&mut self, genre: GenreFilter) {
        self.genre = genre;
        self.page = 1;
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.status = status;
        self.page = 1;
    }

    /// Jump to `page`, kept within `1..=max(total_pages, 1)`
    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.page = page.clamp(1, total_pages.max(1));
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.go_to(self.page.saturating_add(1), total_pages);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}
