//! # Bookshelf API
//!
//! Client side of the bookshelf backend: the domain model, the JSON
//! normalizer, the shelf partitioner, and the HTTP gateway with its session
//! bridge.
//!
//! ## Example
//!
//! ```no_run
//! use bookshelf_api::{Gateway, SessionBridge, StaticToken};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The gateway holds the bridge; the auth layer fills it in later
//!     let session = SessionBridge::new();
//!     let gateway = Gateway::new("http://127.0.0.1:5000", Arc::new(session.clone()))?;
//!
//!     session.initialize(Arc::new(StaticToken::new("token")));
//!
//!     let books = gateway.search_books("dune", 10).await?;
//!     println!("{} results", books.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - Typed `{book}` / `{books}` envelopes with [`GatewayError::MalformedResponse`] on shape errors
//! - Shelf transitions reconciled against the server ([`Gateway::apply_transition`])
//! - ISBN-10 / ISBN-13 validation

pub mod book;
pub mod client;
pub mod error;
pub mod gateway;
pub mod isbn;
pub mod session;
pub mod shelves;

// Re-export main types for convenience
pub use book::{Book, BookEnvelope, BooksEnvelope, ShelfTag, UnknownShelf, normalize_book_json};
pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Gateway, parse_base_url};
pub use error::GatewayError;
pub use gateway::{BookGateway, Category, SearchScope, ShelfTransition};
pub use isbn::{BookId, Isbn10, Isbn13, IsbnError};
pub use session::{SessionBridge, StaticToken, TokenSource};
pub use shelves::{Shelves, partition};

/// URL type used for the backend base URL
pub use reqwest::Url;
