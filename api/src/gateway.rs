//! The gateway seam used by the state layer.
//!
//! [`BookGateway`] is what slices depend on; [`crate::Gateway`] is the HTTP
//! implementation and tests substitute their own.

use crate::book::{Book, ShelfTag};
use crate::error::GatewayError;
use crate::shelves::Shelves;
use futures::future::BoxFuture;
use std::fmt;

/// Which search endpoint to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchScope {
    /// The whole catalog (`/search/books`)
    Catalog,
    /// The user's shelves (`/search/shelves`)
    Shelves,
}

impl SearchScope {
    /// Path under the base URL
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Catalog => "search/books",
            Self::Shelves => "search/shelves",
        }
    }
}

/// Bestseller list category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Fiction list
    Fiction,
    /// Non-fiction list
    NonFiction,
}

impl Category {
    /// Wire value used in the path
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fiction => "fiction",
            Self::NonFiction => "non-fiction",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a book gets onto a target shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfTransition {
    /// Already on the target shelf; no request
    Unchanged(ShelfTag),
    /// Not on any shelf: `POST /book`
    Create(ShelfTag),
    /// On another shelf: `PATCH /book/{id}`
    Patch(ShelfTag),
}

impl ShelfTransition {
    /// Decide from the book's in-memory shelf tag
    #[must_use]
    pub fn plan(book: &Book, target: ShelfTag) -> Self {
        match book.shelf {
            None => Self::Create(target),
            Some(current) if current == target => Self::Unchanged(target),
            Some(_) => Self::Patch(target),
        }
    }

    /// Shelf the book ends up on
    #[must_use]
    pub const fn target(self) -> ShelfTag {
        match self {
            Self::Unchanged(tag) | Self::Create(tag) | Self::Patch(tag) => tag,
        }
    }
}

/// Backend operations the state layer depends on
///
/// Futures are boxed so the trait can be used as `Arc<dyn BookGateway>`.
pub trait BookGateway: Send + Sync {
    /// Fetch all three shelves (`GET /booklist/{tag}` for each)
    fn fetch_shelves(&self) -> BoxFuture<'_, Result<Shelves, GatewayError>>;

    /// Fetch one book (`GET /book/{id}`)
    fn fetch_book<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Book, GatewayError>>;

    /// Search the catalog or the shelves
    fn search<'a>(
        &'a self,
        scope: SearchScope,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Book>, GatewayError>>;

    /// Fetch one bestseller list
    fn fetch_bestsellers(&self, category: Category) -> BoxFuture<'_, Result<Vec<Book>, GatewayError>>;

    /// Put `book` on `target`, returning the transition actually performed
    fn apply_transition<'a>(
        &'a self,
        book: &'a Book,
        target: ShelfTag,
    ) -> BoxFuture<'a, Result<ShelfTransition, GatewayError>>;

    /// Take `book` off its shelf (`DELETE /book/{isbn13}`)
    fn remove_from_shelf<'a>(&'a self, book: &'a Book) -> BoxFuture<'a, Result<(), GatewayError>>;
}
