//! Domain model: [`Book`], [`ShelfTag`], response envelopes and the JSON normalizer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One of the three shelves a book can be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShelfTag {
    /// Finished books
    #[serde(rename = "read")]
    Read,
    /// Books queued to read
    #[serde(rename = "want-to-read")]
    WantToRead,
    /// Books being read now
    #[serde(rename = "currently-reading")]
    CurrentlyReading,
}

impl ShelfTag {
    /// Every shelf, in display order
    pub const ALL: [Self; 3] = [Self::CurrentlyReading, Self::WantToRead, Self::Read];

    /// Wire value used in paths and bodies
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::WantToRead => "want-to-read",
            Self::CurrentlyReading => "currently-reading",
        }
    }

    /// Human-readable shelf name
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::WantToRead => "Want to Read",
            Self::CurrentlyReading => "Currently Reading",
        }
    }
}

impl fmt::Display for ShelfTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown shelf name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown shelf {0:?} (expected read, want-to-read or currently-reading)")]
pub struct UnknownShelf(pub String);

impl FromStr for ShelfTag {
    type Err = UnknownShelf;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownShelf(s.to_string()))
    }
}

/// A book as returned by the backend, in canonical shape
///
/// Fields the backend sends that are not modelled here are kept in
/// [`Book::extra`] and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Title
    pub title: String,
    /// Subtitle (empty when absent)
    #[serde(default, deserialize_with = "string_or_null")]
    pub subtitle: String,
    /// Author names
    #[serde(default, deserialize_with = "vec_or_null")]
    pub authors: Vec<String>,
    /// Publication date as sent by the backend
    #[serde(default, alias = "date_published", skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    /// Subject tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    /// Cover image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Shelf the book is on; `None` when it is on no shelf
    #[serde(default)]
    pub shelf: Option<ShelfTag>,
    /// Publisher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Rating (0 when absent)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: f64,
    /// Synopsis (empty when absent)
    #[serde(default, deserialize_with = "string_or_null")]
    pub synopsis: String,
    /// Page count (0 when absent)
    #[serde(default, deserialize_with = "lenient_u32")]
    pub pages: u32,
    /// ISBN-10
    #[serde(default, deserialize_with = "string_or_null")]
    pub isbn: String,
    /// ISBN-13
    #[serde(default, deserialize_with = "string_or_null")]
    pub isbn13: String,
    /// Language code
    #[serde(default, deserialize_with = "string_or_null")]
    pub language: String,
    /// Everything else the backend sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    /// Create a book with only a title and identifiers set
    #[must_use]
    pub fn new(title: impl Into<String>, isbn13: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            authors: Vec::new(),
            date_published: None,
            subjects: None,
            image: None,
            shelf: None,
            publisher: None,
            rating: 0.0,
            synopsis: String::new(),
            pages: 0,
            isbn: String::new(),
            isbn13: isbn13.into(),
            language: String::new(),
            extra: Map::new(),
        }
    }

    /// Identity key: ISBN-13, falling back to ISBN-10
    #[must_use]
    pub fn id(&self) -> &str {
        if self.isbn13.is_empty() {
            &self.isbn
        } else {
            &self.isbn13
        }
    }

    /// Whether `id` names this book by either identifier
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        !id.is_empty() && (self.isbn13 == id || self.isbn == id)
    }

    /// The same record with a different shelf tag
    #[must_use]
    pub fn with_shelf(mut self, shelf: Option<ShelfTag>) -> Self {
        self.shelf = shelf;
        self
    }
}

/// `{ "book": ... }`
#[derive(Debug, Clone, Deserialize)]
pub struct BookEnvelope {
    /// The wrapped record
    pub book: Book,
}

/// `{ "books": [...] }`
#[derive(Debug, Clone, Deserialize)]
pub struct BooksEnvelope {
    /// The wrapped records
    pub books: Vec<Book>,
}

/// Canonicalize a server-shaped book record
///
/// Moves `date_published` into `datePublished` and drops the snake-case key.
/// An existing non-null `datePublished` is kept. Everything else passes
/// through. Applying it twice is the same as applying it once.
///
/// ```
/// use bookshelf_api::normalize_book_json;
/// use serde_json::json;
///
/// let book = normalize_book_json(json!({ "title": "Dune", "date_published": "1965" }));
/// assert_eq!(book, json!({ "title": "Dune", "datePublished": "1965" }));
/// ```
#[must_use]
pub fn normalize_book_json(mut value: Value) -> Value {
    if let Value::Object(fields) = &mut value {
        if let Some(snake) = fields.remove("date_published") {
            let canonical_missing = fields.get("datePublished").is_none_or(Value::is_null);
            if canonical_missing {
                fields.insert("datePublished".to_string(), snake);
            }
        }
    }
    value
}

/// Normalize the records inside a `book`/`books` envelope in place
pub(crate) fn normalize_envelope(mut value: Value) -> Value {
    if let Some(book) = value.get_mut("book") {
        *book = normalize_book_json(book.take());
    }
    if let Some(Value::Array(books)) = value.get_mut("books") {
        for book in books.iter_mut() {
            *book = normalize_book_json(book.take());
        }
    }
    value
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn vec_or_null<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A number the backend may send as a JSON number or a numeric string
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

fn numeric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Numeric::Number(n)) => Ok(Some(n)),
        Some(Numeric::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Numeric::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {text:?}"))),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(numeric(deserializer)?.unwrap_or_default())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match numeric(deserializer)? {
        None => Ok(0),
        Some(n) if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) => Ok(n.round() as u32),
        Some(n) => Err(serde::de::Error::custom(format!("invalid page count {n}"))),
    }
}
