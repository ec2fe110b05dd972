//! Borrow (loan ledger) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Ledger entry for one borrow transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: Uuid,
    /// Borrowed book
    #[sqlx(rename = "book_id")]
    pub book: Uuid,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Borrow {
    pub fn new(request: &CreateBorrow) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            book: request.book,
            quantity: request.quantity,
            due_date: request.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Borrow request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrow {
    /// Book ID
    pub book: Uuid,
    /// Number of copies to take
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Due date (ISO 8601 with offset)
    pub due_date: DateTime<Utc>,
}

/// Result of a committed borrow
#[derive(Debug, Clone)]
pub struct BorrowOutcome {
    pub borrow: Borrow,
    /// Copies left on the shelf after the decrement
    pub copies_left: i32,
}

/// Book projection used in the borrow summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BorrowedBook {
    pub title: String,
    pub isbn: String,
}

/// Total borrowed quantity for one book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummary {
    pub book: BorrowedBook,
    pub total_quantity: i64,
}

/// Flat aggregation row
#[derive(Debug, FromRow)]
pub struct BorrowSummaryRow {
    pub title: String,
    pub isbn: String,
    pub total_quantity: i64,
}

impl From<BorrowSummaryRow> for BorrowSummary {
    fn from(row: BorrowSummaryRow) -> Self {
        Self {
            book: BorrowedBook {
                title: row.title,
                isbn: row.isbn,
            },
            total_quantity: row.total_quantity,
        }
    }
}
