//! Sample catalog for development stores.
//!
//! Not part of the dashboard core: it only fills an empty local store so
//! there is something to page through. The data is fixed, statuses included.

use crate::models::book::{BookDraft, BookStatus};

const SAMPLES: &[(&str, &str, &str, i32)] = &[
    ("The Hobbit", "J.R.R. Tolkien", "Fantasy", 1937),
    ("Dune", "Frank Herbert", "Science Fiction", 1965),
    ("Pride and Prejudice", "Jane Austen", "Classic", 1813),
    ("A Wizard of Earthsea", "Ursula K. Le Guin", "Fantasy", 1968),
    ("Foundation", "Isaac Asimov", "Science Fiction", 1951),
    ("The Murder of Roger Ackroyd", "Agatha Christie", "Mystery", 1926),
    ("Jane Eyre", "Charlotte Brontë", "Classic", 1847),
    ("The Left Hand of Darkness", "Ursula K. Le Guin", "Science Fiction", 1969),
    ("The Name of the Wind", "Patrick Rothfuss", "Fantasy", 2007),
    ("The Hound of the Baskervilles", "Arthur Conan Doyle", "Mystery", 1902),
    ("Neuromancer", "William Gibson", "Science Fiction", 1984),
    ("Mansfield Park", "Jane Austen", "Classic", 1814),
];

/// Drafts for the sample catalog; every third book starts out issued
pub fn sample_books() -> Vec<BookDraft> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, &(title, author, genre, year))| BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            genre: Some(genre.to_string()),
            year: Some(year),
            status: if i % 3 == 2 {
                BookStatus::Issued
            } else {
                BookStatus::Available
            },
            image_url: None,
        })
        .collect()
}
