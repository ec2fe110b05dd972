//! Book (catalog) endpoints

use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookInput, BookQuery},
};

use super::{ApiPath, ApiResponse, ValidatedJson, ValidatedQuery};

/// List books with genre filter, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Page of books in the envelope `data`, pagination in `meta`", body = Vec<Book>),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    ValidatedQuery(query): ValidatedQuery<BookQuery>,
) -> AppResult<ApiResponse<Vec<Book>>> {
    let page = state.services.catalog.list_books(&query).await?;

    Ok(ApiResponse::ok("Books retrieved successfully", page.books).with_meta(page.meta))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(ApiResponse::ok("Book retrieved successfully", book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "ISBN already in the catalog", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ValidatedJson(input): ValidatedJson<BookInput>,
) -> AppResult<(StatusCode, ApiResponse<Book>)> {
    let created = state.services.catalog.create_book(input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Book created successfully", created),
    ))
}

/// Replace the fields of an existing book
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 409, description = "ISBN used by another book", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(input): ValidatedJson<BookInput>,
) -> AppResult<ApiResponse<Book>> {
    let updated = state.services.catalog.update_book(id, input).await?;
    Ok(ApiResponse::ok("Book updated successfully", updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted, `data` is null"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.services.catalog.delete_book(id).await?;
    Ok(ApiResponse::ok("Book deleted successfully", ()))
}
