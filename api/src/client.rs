//! HTTP gateway to the bookshelf backend

use crate::{
    book::{Book, BookEnvelope, BooksEnvelope, ShelfTag, normalize_envelope},
    error::GatewayError,
    gateway::{BookGateway, Category, SearchScope, ShelfTransition},
    session::TokenSource,
    shelves::Shelves,
};
use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, Url, header::{ACCEPT, CONTENT_TYPE}};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Backend used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Per-request timeout used by [`Gateway::new`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bookshelf backend client
///
/// Every call asks the injected [`TokenSource`] for a fresh bearer token.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Validate an http(s) base URL
///
/// # Errors
///
/// Returns [`GatewayError::InvalidBaseUrl`] if `raw` does not parse or is not http(s).
pub fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(raw).map_err(|e| GatewayError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(GatewayError::InvalidBaseUrl(format!("{raw}: scheme must be http or https")))
    }
}

impl Gateway {
    /// Create a gateway for `base_url` with the default timeout
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidBaseUrl`] for a bad URL, or
    /// [`GatewayError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenSource>) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, tokens, DEFAULT_TIMEOUT)
    }

    /// Create a gateway with an explicit per-request timeout
    ///
    /// # Errors
    ///
    /// See [`Gateway::new`].
    pub fn with_timeout(
        base_url: &str,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// The backend base URL
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one shelf (`GET /booklist/{tag}`)
    ///
    /// Every returned book carries `tag`.
    ///
    /// # Errors
    ///
    /// Returns errors for missing sessions, network failures, non-success statuses, or malformed bodies.
    pub async fn fetch_shelf(&self, tag: ShelfTag) -> Result<Vec<Book>, GatewayError> {
        let value = self
            .call("fetch_shelf", Method::GET, &["booklist", tag.as_str()], &[], None)
            .await?;
        let envelope: BooksEnvelope = decode(normalize_envelope(value))?;

        Ok(envelope
            .books
            .into_iter()
            .map(|book| book.with_shelf(Some(tag)))
            .collect())
    }

    /// Fetch all three shelves concurrently; any failure fails the whole fetch
    ///
    /// # Errors
    ///
    /// Returns the first error among the three shelf fetches.
    pub async fn fetch_shelves(&self) -> Result<Shelves, GatewayError> {
        let (read, want_to_read, currently_reading) = futures::try_join!(
            self.fetch_shelf(ShelfTag::Read),
            self.fetch_shelf(ShelfTag::WantToRead),
            self.fetch_shelf(ShelfTag::CurrentlyReading),
        )?;

        Ok(Shelves {
            read,
            want_to_read,
            currently_reading,
        })
    }

    /// Fetch one book by ISBN-13 or ISBN-10 (`GET /book/{id}`)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when the backend has no such book, and
    /// the usual session, network, status, or decoding errors otherwise.
    pub async fn fetch_book(&self, id: &str) -> Result<Book, GatewayError> {
        let value = self
            .call("fetch_book", Method::GET, &["book", id], &[], None)
            .await?;
        let envelope: BookEnvelope = decode(normalize_envelope(value))?;
        Ok(envelope.book)
    }

    /// Put a book on a shelf for the first time (`POST /book`)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Conflict`] when the book is already on a shelf.
    pub async fn create_book(&self, book: &Book, shelf: ShelfTag) -> Result<Value, GatewayError> {
        let body = json!({
            "isbn13": book.isbn13,
            "title": book.title,
            "authors": book.authors,
            "image": book.image,
            "shelf": shelf,
        });
        self.call("create_book", Method::POST, &["book"], &[], Some(body))
            .await
    }

    /// Move a shelved book to another shelf (`PATCH /book/{id}`)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] or [`GatewayError::Conflict`] when the
    /// book is not on any shelf server-side.
    pub async fn patch_shelf(&self, id: &str, shelf: ShelfTag) -> Result<Value, GatewayError> {
        self.call(
            "patch_shelf",
            Method::PATCH,
            &["book", id],
            &[],
            Some(json!({ "shelf": shelf })),
        )
        .await
    }

    /// Take a book off its shelf (`DELETE /book/{id}`)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] when the book is not shelved.
    pub async fn delete_book(&self, id: &str) -> Result<Value, GatewayError> {
        self.call("delete_book", Method::DELETE, &["book", id], &[], None)
            .await
    }

    /// Search the catalog (`GET /search/books`)
    ///
    /// # Errors
    ///
    /// Returns errors for missing sessions, network failures, non-success statuses, or malformed bodies.
    pub async fn search_books(&self, query: &str, limit: usize) -> Result<Vec<Book>, GatewayError> {
        self.search_in(SearchScope::Catalog, query, limit).await
    }

    /// Search the user's shelves (`GET /search/shelves`)
    ///
    /// # Errors
    ///
    /// Returns errors for missing sessions, network failures, non-success statuses, or malformed bodies.
    pub async fn search_shelves(&self, query: &str, limit: usize) -> Result<Vec<Book>, GatewayError> {
        self.search_in(SearchScope::Shelves, query, limit).await
    }

    async fn search_in(
        &self,
        scope: SearchScope,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Book>, GatewayError> {
        let limit = limit.to_string();
        let segments: Vec<&str> = scope.path().split('/').collect();
        let value = self
            .call(
                "search",
                Method::GET,
                &segments,
                &[("q", query), ("limit", limit.as_str())],
                None,
            )
            .await?;
        let envelope: BooksEnvelope = decode(normalize_envelope(value))?;
        Ok(envelope.books)
    }

    /// Fetch a bestseller list (`GET /ny-times/best-sellers/{category}`)
    ///
    /// # Errors
    ///
    /// Returns errors for missing sessions, network failures, non-success statuses, or malformed bodies.
    pub async fn fetch_bestsellers(&self, category: Category) -> Result<Vec<Book>, GatewayError> {
        let value = self
            .call(
                "fetch_bestsellers",
                Method::GET,
                &["ny-times", "best-sellers", category.as_str()],
                &[],
                None,
            )
            .await?;
        let envelope: BooksEnvelope = decode(normalize_envelope(value))?;
        Ok(envelope.books)
    }

    /// Put `book` on `target`
    ///
    /// The request is chosen from the book's in-memory tag
    /// ([`ShelfTransition::plan`]). If the server disagrees (a create answered
    /// with 409, or a patch answered with 404/409) the other request is tried
    /// once. Returns the transition that succeeded.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempted request.
    pub async fn apply_transition(
        &self,
        book: &Book,
        target: ShelfTag,
    ) -> Result<ShelfTransition, GatewayError> {
        let planned = ShelfTransition::plan(book, target);

        match (planned, self.execute(book, planned).await) {
            (ShelfTransition::Create(tag), Err(error)) if error.is_conflict() => {
                tracing::warn!(id = book.id(), %error, "Book already shelved server-side, patching instead");
                let fallback = ShelfTransition::Patch(tag);
                self.execute(book, fallback).await.map(|()| fallback)
            },
            (ShelfTransition::Patch(tag), Err(error)) if error.is_not_found() || error.is_conflict() => {
                tracing::warn!(id = book.id(), %error, "Book not shelved server-side, creating instead");
                let fallback = ShelfTransition::Create(tag);
                self.execute(book, fallback).await.map(|()| fallback)
            },
            (planned, result) => result.map(|()| planned),
        }
    }

    async fn execute(&self, book: &Book, transition: ShelfTransition) -> Result<(), GatewayError> {
        match transition {
            ShelfTransition::Unchanged(_) => Ok(()),
            ShelfTransition::Create(tag) => self.create_book(book, tag).await.map(drop),
            ShelfTransition::Patch(tag) => self.patch_shelf(book.id(), tag).await.map(drop),
        }
    }

    /// Issue one request and return the JSON body of a success response
    async fn call(
        &self,
        operation: &'static str,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        let result = self.send(method, segments, query, body).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(GatewayError::NotFound(_)) => "not_found",
            Err(GatewayError::Conflict(_)) => "conflict",
            Err(GatewayError::Status { .. }) => "status",
            Err(GatewayError::MalformedResponse(_)) => "malformed",
            Err(GatewayError::AuthNotInitialized | GatewayError::Token(_)) => "unauthenticated",
            Err(GatewayError::Transport(_) | GatewayError::InvalidBaseUrl(_)) => "transport",
        };
        metrics::counter!("gateway.requests.total", "operation" => operation, "outcome" => outcome)
            .increment(1);

        result
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        let token = self.tokens.access_token().await?;
        let url = self.url(segments)?;

        tracing::debug!(%method, path = url.path(), "Sending request");

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(token)
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        // Mutations always declare JSON, even the body-less DELETE
        if let Some(body) = body {
            request = request.json(&body);
        } else if method != Method::GET {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!(%method, path = url.path(), status = status.as_u16(), "Received response");

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| GatewayError::MalformedResponse(e.to_string()));
        }

        let message = response.text().await.unwrap_or_default();
        let message = if message.is_empty() {
            format!("{method} {}", url.path())
        } else {
            message
        };

        Err(match status {
            StatusCode::NOT_FOUND => GatewayError::NotFound(message),
            StatusCode::CONFLICT => GatewayError::Conflict(message),
            status => GatewayError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

impl BookGateway for Gateway {
    fn fetch_shelves(&self) -> BoxFuture<'_, Result<Shelves, GatewayError>> {
        Box::pin(Gateway::fetch_shelves(self))
    }

    fn fetch_book<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Book, GatewayError>> {
        Box::pin(Gateway::fetch_book(self, id))
    }

    fn search<'a>(
        &'a self,
        scope: SearchScope,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Book>, GatewayError>> {
        Box::pin(self.search_in(scope, query, limit))
    }

    fn fetch_bestsellers(&self, category: Category) -> BoxFuture<'_, Result<Vec<Book>, GatewayError>> {
        Box::pin(Gateway::fetch_bestsellers(self, category))
    }

    fn apply_transition<'a>(
        &'a self,
        book: &'a Book,
        target: ShelfTag,
    ) -> BoxFuture<'a, Result<ShelfTransition, GatewayError>> {
        Box::pin(Gateway::apply_transition(self, book, target))
    }

    fn remove_from_shelf<'a>(&'a self, book: &'a Book) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move { self.delete_book(book.id()).await.map(drop) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::StaticToken;

    fn gateway(base: &str) -> Gateway {
        Gateway::new(base, Arc::new(StaticToken::new("t"))).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let gateway = gateway(DEFAULT_BASE_URL);
        assert_eq!(gateway.base_url().as_str(), "http://127.0.0.1:5000/");
    }

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(matches!(parse_base_url("ftp://example.com"), Err(GatewayError::InvalidBaseUrl(_))));
        assert!(matches!(parse_base_url("not a url"), Err(GatewayError::InvalidBaseUrl(_))));
    }

    #[test]
    fn builds_escaped_paths_under_base() {
        let gateway = gateway("http://localhost:5000/api/");
        let url = gateway.url(&["book", "978 0"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/book/978%200");
    }
}
