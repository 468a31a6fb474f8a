//! HTTP gateway tests against a mock backend

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use bookshelf_api::{
    Book, BookGateway, Category, Gateway, GatewayError, SearchScope, SessionBridge, ShelfTag,
    ShelfTransition, StaticToken,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> Gateway {
    Gateway::new(&server.uri(), Arc::new(StaticToken::new("secret"))).expect("valid base url")
}

fn dune_json() -> serde_json::Value {
    json!({
        "title": "Dune",
        "authors": ["Frank Herbert"],
        "isbn": "0441013597",
        "isbn13": "9780441013593",
        "date_published": "2005-08-02",
        "shelf": "read",
        "rating": 4.3,
        "pages": 604,
    })
}

#[tokio::test]
async fn search_sends_credentials_and_normalizes_books() {
    let server = MockServer::start().await;
    let books: Vec<_> = (0..10).map(|_| dune_json()).collect();

    Mock::given(method("GET"))
        .and(path("/search/books"))
        .and(query_param("q", "dune"))
        .and(query_param("limit", "10"))
        .and(header("authorization", "Bearer secret"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "books": books })))
        .expect(1)
        .mount(&server)
        .await;

    let results = gateway(&server).search_books("dune", 10).await.unwrap();

    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|b| b.date_published.as_deref() == Some("2005-08-02")));
    assert!(results.iter().all(|b| !b.extra.contains_key("date_published")));
}

#[tokio::test]
async fn shelf_search_uses_its_own_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/shelves"))
        .and(query_param("q", "herbert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "books": [dune_json()] })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let results = BookGateway::search(&gateway, SearchScope::Shelves, "herbert", 5)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn missing_book_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/book/9780441013593"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such book"))
        .mount(&server)
        .await;

    let error = gateway(&server).fetch_book("9780441013593").await.unwrap_err();

    assert!(error.is_not_found());
    assert_eq!(error, GatewayError::NotFound("no such book".to_string()));
}

#[tokio::test]
async fn server_errors_carry_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/book/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let error = gateway(&server).fetch_book("1").await.unwrap_err();
    assert_eq!(
        error,
        GatewayError::Status {
            status: 500,
            message: "boom".to_string()
        }
    );
}

#[tokio::test]
async fn uninitialized_session_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "books": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let session = SessionBridge::new();
    let gateway = Gateway::new(&server.uri(), Arc::new(session.clone())).unwrap();

    let error = gateway.search_books("dune", 10).await.unwrap_err();
    assert_eq!(error, GatewayError::AuthNotInitialized);
}

#[tokio::test]
async fn session_initialized_later_is_picked_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/book/9780441013593"))
        .and(header("authorization", "Bearer late"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "book": dune_json() })))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionBridge::new();
    let gateway = Gateway::new(&server.uri(), Arc::new(session.clone())).unwrap();
    session.initialize(Arc::new(StaticToken::new("late")));

    let book = gateway.fetch_book("9780441013593").await.unwrap();
    assert_eq!(book.title, "Dune");
}

#[tokio::test]
async fn unexpected_shape_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ny-times/best-sellers/fiction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "books": "nope" })))
        .mount(&server)
        .await;

    let error = gateway(&server)
        .fetch_bestsellers(Category::Fiction)
        .await
        .unwrap_err();
    assert!(matches!(error, GatewayError::MalformedResponse(_)));
}

#[tokio::test]
async fn shelves_are_fetched_and_tagged() {
    let server = MockServer::start().await;
    for (tag, title) in [
        ("read", "Dune"),
        ("want-to-read", "Emma"),
        ("currently-reading", "Ulysses"),
    ] {
        let mut book = dune_json();
        book["title"] = json!(title);
        book.as_object_mut().unwrap().remove("shelf");
        Mock::given(method("GET"))
            .and(path(format!("/booklist/{tag}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "books": [book] })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let shelves = gateway(&server).fetch_shelves().await.unwrap();

    assert_eq!(shelves.want_to_read[0].title, "Emma");
    assert_eq!(shelves.want_to_read[0].shelf, Some(ShelfTag::WantToRead));
    assert_eq!(shelves.currently_reading[0].shelf, Some(ShelfTag::CurrentlyReading));
    assert_eq!(shelves.total(), 3);
}

#[tokio::test]
async fn one_failing_shelf_fails_the_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/booklist/read"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "books": [] })))
        .mount(&server)
        .await;

    let error = gateway(&server).fetch_shelves().await.unwrap_err();
    assert!(matches!(error, GatewayError::Status { status: 503, .. }));
}

#[tokio::test]
async fn unshelved_book_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/book"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "isbn13": "9780441013593",
            "title": "Dune",
            "authors": ["Frank Herbert"],
            "image": null,
            "shelf": "want-to-read",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut book = Book::new("Dune", "9780441013593");
    book.authors = vec!["Frank Herbert".to_string()];

    let done = gateway(&server)
        .apply_transition(&book, ShelfTag::WantToRead)
        .await
        .unwrap();
    assert_eq!(done, ShelfTransition::Create(ShelfTag::WantToRead));
}

#[tokio::test]
async fn shelved_book_is_patched() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/book/9780441013593"))
        .and(body_json(json!({ "shelf": "read" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let book = Book::new("Dune", "9780441013593").with_shelf(Some(ShelfTag::CurrentlyReading));
    let done = gateway(&server)
        .apply_transition(&book, ShelfTag::Read)
        .await
        .unwrap();
    assert_eq!(done, ShelfTransition::Patch(ShelfTag::Read));
}

#[tokio::test]
async fn stale_create_falls_back_to_patch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already in shelf"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/book/9780441013593"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let book = Book::new("Dune", "9780441013593");
    let done = gateway(&server)
        .apply_transition(&book, ShelfTag::Read)
        .await
        .unwrap();
    assert_eq!(done, ShelfTransition::Patch(ShelfTag::Read));
}

#[tokio::test]
async fn stale_patch_falls_back_to_create() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Shelf not found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/book"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let book = Book::new("Dune", "9780441013593").with_shelf(Some(ShelfTag::Read));
    let done = gateway(&server)
        .apply_transition(&book, ShelfTag::WantToRead)
        .await
        .unwrap();
    assert_eq!(done, ShelfTransition::Create(ShelfTag::WantToRead));
}

#[tokio::test]
async fn same_shelf_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let book = Book::new("Dune", "9780441013593").with_shelf(Some(ShelfTag::Read));
    let done = gateway(&server)
        .apply_transition(&book, ShelfTag::Read)
        .await
        .unwrap();
    assert_eq!(done, ShelfTransition::Unchanged(ShelfTag::Read));
}

#[tokio::test]
async fn removal_deletes_by_isbn13() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/book/9780441013593"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "deleted": "9780441013593" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut book = Book::new("Dune", "9780441013593").with_shelf(Some(ShelfTag::Read));
    book.isbn = "0441013597".to_string();

    let gateway = gateway(&server);
    BookGateway::remove_from_shelf(&gateway, &book).await.unwrap();
}
