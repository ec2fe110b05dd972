//! Borrow ledger repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{book_not_found, not_enough_copies, BorrowStore};
use crate::{
    error::AppResult,
    models::{borrow::BorrowSummaryRow, Borrow, BorrowOutcome, BorrowSummary},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowStore for BorrowsRepository {
    async fn borrow(&self, borrow: &Borrow) -> AppResult<BorrowOutcome> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken by this UPDATE serializes concurrent borrows of
        // the same book until commit.
        let copies_left: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books
            SET copies = copies - $2,
                available = (copies - $2) <> 0,
                updated_at = $3
            WHERE id = $1 AND copies >= $2
            RETURNING copies
            "#,
        )
        .bind(borrow.book)
        .bind(borrow.quantity)
        .bind(borrow.created_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(copies_left) = copies_left else {
            let copies: Option<i32> = sqlx::query_scalar("SELECT copies FROM books WHERE id = $1")
                .bind(borrow.book)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Err(match copies {
                Some(available) => not_enough_copies(borrow.quantity, available),
                None => book_not_found(borrow.book),
            });
        };

        let inserted = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (id, book_id, quantity, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, book_id, quantity, due_date, created_at, updated_at
            "#,
        )
        .bind(borrow.id)
        .bind(borrow.book)
        .bind(borrow.quantity)
        .bind(borrow.due_date)
        .bind(borrow.created_at)
        .bind(borrow.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BorrowOutcome {
            borrow: inserted,
            copies_left,
        })
    }

    async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        let rows = sqlx::query_as::<_, BorrowSummaryRow>(
            r#"
            SELECT b.title, b.isbn, SUM(br.quantity)::BIGINT AS total_quantity
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            GROUP BY b.id, b.title, b.isbn
            ORDER BY b.title, b.isbn
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BorrowSummary::from).collect())
    }
}
