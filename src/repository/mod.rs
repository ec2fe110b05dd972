//! Repository layer for database operations.
//!
//! Handlers never talk to storage directly; services go through the
//! [`BookStore`] and [`BorrowStore`] traits so the PostgreSQL backend and the
//! in-process memory backend are interchangeable.

pub mod books;
pub mod borrows;
pub mod memory;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
    models::{Book, BookInput, BookListParams, Borrow, BorrowOutcome, BorrowSummary},
};

/// Connection strings with this prefix select the memory backend
pub const MEMORY_URL_PREFIX: &str = "memory:";

/// Book catalog storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Round-trip to the backend
    async fn ping(&self) -> AppResult<()>;

    async fn insert(&self, book: &Book) -> AppResult<Book>;

    async fn get(&self, id: Uuid) -> AppResult<Book>;

    /// One page of books plus the total count matching the filter
    async fn list(&self, params: &BookListParams) -> AppResult<(Vec<Book>, i64)>;

    /// Replace every mutable field of an existing book
    async fn replace(&self, id: Uuid, input: &BookInput) -> AppResult<Book>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Borrow ledger storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowStore: Send + Sync {
    /// Decrement the book's copies and append the ledger entry as one atomic
    /// unit. Nothing is written when fewer than `borrow.quantity` copies remain.
    async fn borrow(&self, borrow: &Borrow) -> AppResult<BorrowOutcome>;

    /// Total borrowed quantity per existing book
    async fn summary(&self) -> AppResult<Vec<BorrowSummary>>;
}

/// Main repository struct holding the store handles
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub borrows: Arc<dyn BorrowStore>,
}

impl Repository {
    /// Repository backed by a PostgreSQL pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            borrows: Arc::new(borrows::BorrowsRepository::new(pool)),
        }
    }

    /// Repository backed by process memory
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self {
            books: Arc::new(store.clone()),
            borrows: Arc::new(store),
        }
    }

    /// Open the backend named by the connection string and run migrations
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        if config.url.starts_with(MEMORY_URL_PREFIX) {
            tracing::warn!("Using the in-memory store, data will not survive a restart");
            return Ok(Self::in_memory());
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run database migrations: {}", e)))?;

        tracing::info!("Database migrations completed");

        Ok(Self::postgres(pool))
    }
}

pub(crate) fn book_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}

pub(crate) fn duplicate_isbn(isbn: &str) -> AppError {
    AppError::Conflict(format!("A book with ISBN {} already exists", isbn))
}

pub(crate) fn not_enough_copies(requested: i32, available: i32) -> AppError {
    AppError::BusinessRule(format!(
        "The requested quantity is bigger than the available copies ({} requested, {} available)",
        requested, available
    ))
}
