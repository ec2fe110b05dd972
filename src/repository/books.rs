//! Books repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{book_not_found, duplicate_isbn, BookStore};
use crate::{
    error::{AppError, AppResult},
    models::{book::BookRow, Book, BookInput, BookListParams},
};

const BOOK_COLUMNS: &str =
    "id, title, author, genre, isbn, description, copies, available, created_at, updated_at";

/// Turns a unique violation on `isbn` into a conflict
fn map_write_error(err: sqlx::Error, isbn: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_isbn(isbn),
        _ => AppError::Database(err),
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, book: &Book) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books ({BOOK_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BOOK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.genre.as_str())
            .bind(&book.isbn)
            .bind(&book.description)
            .bind(book.copies)
            .bind(book.available)
            .bind(book.created_at)
            .bind(book.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &book.isbn))?;

        Book::try_from(row)
    }

    async fn get(&self, id: Uuid) -> AppResult<Book> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");

        sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| book_not_found(id))
            .and_then(Book::try_from)
    }

    async fn list(&self, params: &BookListParams) -> AppResult<(Vec<Book>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        if let Some(genre) = params.genre {
            count.push(" WHERE genre = ").push_bind(genre.as_str());
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {BOOK_COLUMNS} FROM books"));
        if let Some(genre) = params.genre {
            select.push(" WHERE genre = ").push_bind(genre.as_str());
        }
        // Column and direction come from closed enums, never from raw input
        select.push(format!(
            " ORDER BY {} {}, id ASC",
            params.sort_by.column(),
            params.order.as_sql()
        ));
        select
            .push(" LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());

        let books = select
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Book::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((books, total))
    }

    async fn replace(&self, id: Uuid, input: &BookInput) -> AppResult<Book> {
        let query = format!(
            r#"
            UPDATE books
            SET title = $2, author = $3, genre = $4, isbn = $5, description = $6,
                copies = $7, available = $8, updated_at = $9
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.author)
            .bind(input.genre.as_str())
            .bind(&input.isbn)
            .bind(&input.description)
            .bind(input.copies)
            .bind(input.available)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &input.isbn))?
            .ok_or_else(|| book_not_found(id))
            .and_then(Book::try_from)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(book_not_found(id));
        }

        Ok(())
    }
}
