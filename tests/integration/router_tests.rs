//! In-process router tests against the memory store

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use library_api::{api, config::AppConfig, repository::Repository, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    api::router(AppState::new(AppConfig::default(), Repository::in_memory()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

fn book_json(title: &str, isbn: &str, copies: i64) -> Value {
    json!({
        "title": title,
        "author": "Ursula K. Le Guin",
        "isbn": isbn,
        "description": "A book worth borrowing.",
        "copies": copies
    })
}

async fn create_book(app: &Router, title: &str, isbn: &str, copies: i64) -> String {
    let (status, body) = send(app, Method::POST, "/api/books", Some(book_json(title, isbn, copies))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().expect("No book ID").to_string()
}

async fn borrow(app: &Router, book_id: &str, quantity: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/borrow",
        Some(json!({
            "book": book_id,
            "quantity": quantity,
            "dueDate": "2030-01-15T00:00:00.000Z"
        })),
    )
    .await
}

async fn book_by_id(app: &Router, book_id: &str) -> Value {
    let (status, body) = send(app, Method::GET, &format!("/api/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].clone()
}

#[tokio::test]
async fn test_create_book_applies_defaults() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(book_json("  The Dispossessed  ", "9780061054884", 3)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book created successfully");
    assert_eq!(body["data"]["title"], "The Dispossessed");
    assert_eq!(body["data"]["genre"], "FICTION");
    assert_eq!(body["data"]["available"], true);
    assert!(body["data"]["createdAt"].is_string());
    assert!(body.get("meta").is_none());
}

#[tokio::test]
async fn test_create_book_validation_errors_are_embedded() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({
            "title": "ab",
            "author": "Ursula K. Le Guin",
            "isbn": "123",
            "description": "A book worth borrowing.",
            "copies": 0,
            "genre": "FICTION"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let details = &body["error"]["details"];
    assert!(details["title"].is_array());
    assert!(details["isbn"].is_array());
    assert!(details["copies"].is_array());
}

#[tokio::test]
async fn test_unknown_genre_is_rejected() {
    let app = app();
    let mut book = book_json("The Lathe of Heaven", "9781416556961", 1);
    book["genre"] = json!("POETRY");

    let (status, body) = send(&app, Method::POST, "/api/books", Some(book)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_duplicate_isbn_conflicts() {
    let app = app();
    create_book(&app, "A Wizard of Earthsea", "9780547773742", 2).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(book_json("The Tombs of Atuan", "9780547773742", 2)),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_get_missing_and_malformed_ids() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/books/1b4e28ba-2fa1-11d2-883f-0016d3cca427",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/books/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_list_sorts_filters_and_paginates() {
    let app = app();
    create_book(&app, "Beloved", "9781400033416", 1).await;
    create_book(&app, "Circe", "9780316556347", 1).await;
    create_book(&app, "Anathem", "9780061474095", 1).await;

    let mut history = book_json("SPQR", "9781631492228", 1);
    history["genre"] = json!("HISTORY");
    let (status, _) = send(&app, Method::POST, "/api/books", Some(history)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, "/api/books?sortBy=title&sort=desc", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["SPQR", "Circe", "Beloved", "Anathem"]);
    assert_eq!(body["meta"]["totalItems"], 4);
    assert_eq!(body["meta"]["totalPages"], 1);
    assert_eq!(body["meta"]["currentPage"], 1);
    assert_eq!(body["meta"]["totalItemsPerPage"], 10);

    let (_, body) = send(&app, Method::GET, "/api/books?sortBy=title&limit=3&page=2", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "SPQR");
    assert_eq!(body["meta"]["totalPages"], 2);

    let (_, body) = send(&app, Method::GET, "/api/books?filter=HISTORY", None).await;
    assert_eq!(body["meta"]["totalItems"], 1);
    assert_eq!(body["data"][0]["genre"], "HISTORY");

    let (_, body) = send(&app, Method::GET, "/api/books?filter=", None).await;
    assert_eq!(body["meta"]["totalItems"], 4);
}

#[tokio::test]
async fn test_list_rejects_bad_query() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/api/books?sortBy=password", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/books?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["limit"].is_array());
}

#[tokio::test]
async fn test_update_and_delete_book() {
    let app = app();
    let id = create_book(&app, "Kindred", "9780807083697", 2).await;

    let mut replacement = book_json("Kindred (Anniversary Edition)", "9780807083697", 6);
    replacement["genre"] = json!("HISTORY");
    let (status, body) = send(&app, Method::PUT, &format!("/api/books/{id}"), Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully");
    assert_eq!(body["data"]["title"], "Kindred (Anniversary Edition)");
    assert_eq!(body["data"]["genre"], "HISTORY");
    assert_eq!(body["data"]["copies"], 6);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());

    let (status, _) = send(&app, Method::GET, &format!("/api/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/books/{id}"),
        Some(book_json("Kindred", "9780807083697", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_borrow_workflow() {
    let app = app();
    let id = create_book(&app, "Parable of the Sower", "9781538732182", 5).await;

    let (status, body) = borrow(&app, &id, 3).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Book borrowed successfully");
    assert_eq!(body["data"]["book"], id.as_str());
    assert_eq!(body["data"]["quantity"], 3);

    let book = book_by_id(&app, &id).await;
    assert_eq!(book["copies"], 2);
    assert_eq!(book["available"], true);

    // Too many: rejected, nothing changes
    let (status, body) = borrow(&app, &id, 3).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(book_by_id(&app, &id).await["copies"], 2);

    let (status, _) = borrow(&app, &id, 2).await;
    assert_eq!(status, StatusCode::CREATED);
    let book = book_by_id(&app, &id).await;
    assert_eq!(book["copies"], 0);
    assert_eq!(book["available"], false);
}

#[tokio::test]
async fn test_borrow_rejects_bad_requests() {
    let app = app();
    let id = create_book(&app, "Lilith's Brood", "9780446676106", 5).await;

    let (status, _) = borrow(&app, &id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = borrow(&app, "1b4e28ba-2fa1-11d2-883f-0016d3cca427", 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/borrow",
        Some(json!({ "book": id, "quantity": 1, "dueDate": "next tuesday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_borrow_summary_sums_quantities() {
    let app = app();
    let first = create_book(&app, "Fledgling", "9780446696166", 10).await;
    let second = create_book(&app, "Wild Seed", "9781538751510", 10).await;

    borrow(&app, &first, 2).await;
    borrow(&app, &first, 3).await;
    borrow(&app, &second, 1).await;

    let (status, body) = send(&app, Method::GET, "/api/borrow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Borrowed books summary retrieved successfully");

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["book"]["title"], "Fledgling");
    assert_eq!(rows[0]["book"]["isbn"], "9780446696166");
    assert_eq!(rows[0]["totalQuantity"], 5);
    assert_eq!(rows[1]["book"]["title"], "Wild Seed");
    assert_eq!(rows[1]["totalQuantity"], 1);
}

#[tokio::test]
async fn test_unknown_route_returns_envelope() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The requested URL is not valid");
}

#[tokio::test]
async fn test_unsupported_method_returns_envelope() {
    let app = app();

    let (status, body) = send(&app, Method::PATCH, "/api/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The requested URL is not valid");

    let (status, body) = send(&app, Method::POST, "/health", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_list_rejects_page_beyond_bound() {
    let app = app();
    create_book(&app, "Solaris", "9780156027601", 1).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/books?page=9223372036854775807",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/books?page=1000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_welcome_and_health() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Welcome to Library Management API");

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}
