//! Book model and request types

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::image;

/// Circulation status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
pub enum BookStatus {
    #[default]
    Available,
    Issued,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookStatus::Available => "Available",
            BookStatus::Issued => "Issued",
        };
        write!(f, "{}", label)
    }
}

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque identifier assigned by the store
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Publication year
    #[serde(
        default,
        alias = "publishedYear",
        deserialize_with = "deserialize_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    #[serde(default)]
    pub status: BookStatus,
    /// Cover image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Book {
    /// Build a stored record from a draft and its freshly assigned id
    pub fn from_draft(id: String, draft: &BookDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            author: draft.author.clone(),
            genre: draft.genre.clone(),
            year: draft.year,
            status: draft.status,
            image_url: draft.image_url.clone(),
        }
    }

    /// Merge the supplied fields of `patch` into this record. Optional fields
    /// sent as `null` are cleared. The id never changes.
    pub fn apply(&mut self, patch: &BookPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref author) = patch.author {
            self.author = author.clone();
        }
        if let Some(ref genre) = patch.genre {
            self.genre = genre.clone();
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ref image_url) = patch.image_url {
            self.image_url = image_url.clone();
        }
    }

    /// Copy of this record whose `image_url` is always a usable absolute reference
    pub fn with_display_image(mut self) -> Self {
        let url = image::display_image_url(
            self.image_url.as_deref(),
            &self.title,
            self.genre.as_deref(),
        );
        self.image_url = Some(url);
        self
    }

    /// Image reference to display, derived when the stored one is missing or malformed
    pub fn display_image_url(&self) -> String {
        image::display_image_url(self.image_url.as_deref(), &self.title, self.genre.as_deref())
    }
}

/// Create book request (a book without an id)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    #[validate(custom(function = "title_present"))]
    pub title: String,
    #[validate(custom(function = "author_present"))]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(
        default,
        alias = "publishedYear",
        deserialize_with = "deserialize_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Update book request; only the supplied fields change.
///
/// Optional fields distinguish "absent" (`None`, left unchanged) from an
/// explicit `null` (`Some(None)`, cleared).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "title_present"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "author_present"))]
    pub author: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<String>, nullable)]
    pub genre: Option<Option<String>>,
    #[serde(
        default,
        alias = "publishedYear",
        deserialize_with = "deserialize_patch_year",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i32>, nullable)]
    pub year: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<String>, nullable)]
    pub image_url: Option<Option<String>>,
}

/// A draft becomes a full replacement: every field is sent, and blank
/// optional fields clear what the record had.
impl From<BookDraft> for BookPatch {
    fn from(draft: BookDraft) -> Self {
        Self {
            title: Some(draft.title),
            author: Some(draft.author),
            genre: Some(draft.genre),
            year: Some(draft.year),
            status: Some(draft.status),
            image_url: Some(draft.image_url),
        }
    }
}

fn not_blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(message.into());
        return Err(error);
    }
    Ok(())
}

pub(crate) fn title_present(title: &str) -> Result<(), ValidationError> {
    not_blank(title, "Title is required")
}

pub(crate) fn author_present(author: &str) -> Result<(), ValidationError> {
    not_blank(author, "Author is required")
}

/// Ids arrive as strings or numbers depending on the backend
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Years that are not integers (legacy "Unknown", NaN from empty inputs) read as absent
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Like `deserialize_year`, but a present field (even `null` or unparseable)
/// reads as `Some`, so it clears the stored year
fn deserialize_patch_year<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_year(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_book_from_wire() {
        let book: Book = serde_json::from_value(json!({
            "id": 3,
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "SciFi",
            "publishedYear": "Unknown",
            "status": "Issued"
        }))
        .unwrap();

        assert_eq!(book.id, "3");
        assert_eq!(book.year, None);
        assert_eq!(book.status, BookStatus::Issued);
        assert_eq!(book.image_url, None);
    }

    #[test]
    fn test_book_defaults_to_available() {
        let book: Book = serde_json::from_value(json!({
            "id": "a1",
            "title": "Emma",
            "author": "Jane Austen",
            "year": 1815
        }))
        .unwrap();
        assert_eq!(book.status, BookStatus::Available);
        assert_eq!(book.year, Some(1815));
    }

    #[test]
    fn test_book_serializes_camel_case() {
        let book = Book {
            id: "1".into(),
            title: "Dune".into(),
            author: "Herbert".into(),
            genre: None,
            year: None,
            status: BookStatus::Available,
            image_url: Some("https://covers.example.org/1.jpg".into()),
        };
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["imageUrl"], "https://covers.example.org/1.jpg");
        assert!(value.get("genre").is_none());
    }

    #[test]
    fn test_apply_patch_keeps_id() {
        let mut book = Book::from_draft(
            "42".into(),
            &BookDraft {
                title: "Dune".into(),
                author: "Herbert".into(),
                ..Default::default()
            },
        );
        book.apply(&BookPatch {
            status: Some(BookStatus::Issued),
            genre: Some(Some("SciFi".into())),
            ..Default::default()
        });

        assert_eq!(book.id, "42");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.status, BookStatus::Issued);
        assert_eq!(book.genre.as_deref(), Some("SciFi"));
    }

    #[test]
    fn test_patch_null_clears_absent_keeps() {
        let mut book = Book::from_draft(
            "42".into(),
            &BookDraft {
                title: "Dune".into(),
                author: "Herbert".into(),
                genre: Some("SciFi".into()),
                year: Some(1965),
                image_url: Some("https://covers.example.org/dune.jpg".into()),
                ..Default::default()
            },
        );
        let patch: BookPatch =
            serde_json::from_value(json!({ "genre": null, "publishedYear": null })).unwrap();
        assert_eq!(patch.genre, Some(None));
        assert_eq!(patch.year, Some(None));
        assert_eq!(patch.image_url, None);

        book.apply(&patch);
        assert_eq!(book.genre, None);
        assert_eq!(book.year, None);
        assert_eq!(book.image_url.as_deref(), Some("https://covers.example.org/dune.jpg"));
    }

    #[test]
    fn test_patch_from_draft_sends_cleared_fields() {
        let patch = BookPatch::from(BookDraft {
            title: "Dune".into(),
            author: "Herbert".into(),
            ..Default::default()
        });
        let value = serde_json::to_value(&patch).unwrap();
        assert!(value["genre"].is_null());
        assert!(value["year"].is_null());
        assert!(value["imageUrl"].is_null());
        assert!(value.get("genre").is_some());

        let absent = serde_json::to_value(BookPatch::default()).unwrap();
        assert_eq!(absent, json!({}));
    }

    #[test]
    fn test_draft_validation() {
        let draft = BookDraft {
            title: "   ".into(),
            author: String::new(),
            ..Default::default()
        };
        let errors = draft.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("author"));
    }

    #[test]
    fn test_patch_validation_skips_absent_fields() {
        assert!(BookPatch::default().validate().is_ok());
        let patch = BookPatch {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_with_display_image_never_empty() {
        let book = Book::from_draft(
            "1".into(),
            &BookDraft {
                title: "Dune".into(),
                author: "Herbert".into(),
                ..Default::default()
            },
        )
        .with_display_image();
        let url = book.image_url.unwrap();
        assert!(image::is_well_formed(&url));
        assert!(url.contains("Dune"));
    }
}
