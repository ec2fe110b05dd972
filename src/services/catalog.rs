//! Catalog management service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookInput, BookPage, BookQuery, PageMeta},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }

    /// Create a new book
    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        let book = self.repository.books.insert(&Book::new(input)).await?;
        tracing::info!(book_id = %book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    /// List books with genre filter, sorting and pagination
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        let params = query.resolve();
        let (books, total) = self.repository.books.list(&params).await?;

        Ok(BookPage {
            books,
            meta: PageMeta::new(total, &params),
        })
    }

    /// Get book by ID
    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    /// Replace the fields of an existing book
    pub async fn update_book(&self, id: Uuid, input: BookInput) -> AppResult<Book> {
        let book = self.repository.books.replace(id, &input).await?;
        tracing::info!(book_id = %id, "Book updated");
        Ok(book)
    }

    /// Delete a book. Its borrow records stay in the ledger.
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }
}
