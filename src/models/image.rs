//! Display image references.
//!
//! Every book handed to the dashboard carries a usable image reference. When a
//! record has none, or the one it has is not an absolute `http(s)` URL, a
//! placeholder is derived from the record's genre or title. The placeholder is
//! computed at read time and is never written back to a store.

use reqwest::Url;

/// Placeholder image service used when a book has no usable cover
pub const PLACEHOLDER_BASE: &str = "https://placehold.co/400x600/e2e8f0/1e293b";

/// Whether `reference` is an absolute http or https URL with a host
pub fn is_well_formed(reference: &str) -> bool {
    Url::parse(reference.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Deterministic placeholder for a book with the given title and genre
pub fn placeholder_url(title: &str, genre: Option<&str>) -> String {
    let label = match genre.map(str::trim).filter(|g| !g.is_empty()) {
        Some(genre) => format!("{} Book", genre),
        None => match title.trim() {
            "" => "Book".to_string(),
            title => title.to_string(),
        },
    };

    Url::parse_with_params(PLACEHOLDER_BASE, &[("text", label.as_str())])
        .map(String::from)
        .unwrap_or_else(|_| PLACEHOLDER_BASE.to_string())
}

/// The image reference to display: the supplied one when well formed,
/// otherwise the placeholder.
pub fn display_image_url(image_url: Option<&str>, title: &str, genre: Option<&str>) -> String {
    match image_url {
        Some(url) if is_well_formed(url) => url.trim().to_string(),
        _ => placeholder_url(title, genre),
    }
}
