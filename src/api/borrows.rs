//! Borrow endpoints

use axum::{extract::State, http::StatusCode};

use crate::{
    error::AppResult,
    models::{Borrow, BorrowSummary, CreateBorrow},
};

use super::{ApiResponse, ValidatedJson};

/// Borrow copies of a book
#[utoipa::path(
    post,
    path = "/api/borrow",
    tag = "borrow",
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Book borrowed, `data` is the ledger entry", body = Borrow),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 422, description = "Not enough copies available", body = ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<CreateBorrow>,
) -> AppResult<(StatusCode, ApiResponse<Borrow>)> {
    let borrow = state.services.borrows.borrow(request).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Book borrowed successfully", borrow),
    ))
}

/// Total borrowed quantity per book
#[utoipa::path(
    get,
    path = "/api/borrow",
    tag = "borrow",
    responses(
        (status = 200, description = "Borrowed books summary", body = Vec<BorrowSummary>)
    )
)]
pub async fn borrow_summary(
    State(state): State<crate::AppState>,
) -> AppResult<ApiResponse<Vec<BorrowSummary>>> {
    let summary = state.services.borrows.summary().await?;
    Ok(ApiResponse::ok(
        "Borrowed books summary retrieved successfully",
        summary,
    ))
}
