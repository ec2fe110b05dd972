//! In-process store, selected with a `memory://` connection string

use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{book_not_found, duplicate_isbn, not_enough_copies, BookStore, BorrowStore};
use crate::{
    error::AppResult,
    models::{
        Book, BookInput, BookListParams, Borrow, BorrowOutcome, BorrowSummary, BorrowedBook,
        SortOrder,
    },
};

#[derive(Default)]
struct State {
    /// Insertion order is kept so equal sort keys stay stable
    books: Vec<Book>,
    borrows: Vec<Borrow>,
}

/// Catalog and ledger behind a single lock
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl State {
    fn isbn_taken(&self, isbn: &str, except: Option<Uuid>) -> bool {
        self.books
            .iter()
            .any(|b| b.isbn == isbn && Some(b.id) != except)
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert(&self, book: &Book) -> AppResult<Book> {
        let mut state = self.state.lock().await;
        if state.isbn_taken(&book.isbn, None) {
            return Err(duplicate_isbn(&book.isbn));
        }
        state.books.push(book.clone());
        Ok(book.clone())
    }

    async fn get(&self, id: Uuid) -> AppResult<Book> {
        let state = self.state.lock().await;
        state
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn list(&self, params: &BookListParams) -> AppResult<(Vec<Book>, i64)> {
        let state = self.state.lock().await;

        let mut books: Vec<Book> = state
            .books
            .iter()
            .filter(|b| params.genre.map_or(true, |g| b.genre == g))
            .cloned()
            .collect();

        books.sort_by(|a, b| {
            let ordering = params.sort_by.compare(a, b);
            match params.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = books.len() as i64;
        let skip = usize::try_from(params.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(params.limit).unwrap_or(0);
        let page = books.into_iter().skip(skip).take(take).collect();

        Ok((page, total))
    }

    async fn replace(&self, id: Uuid, input: &BookInput) -> AppResult<Book> {
        let mut state = self.state.lock().await;
        let index = state
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| book_not_found(id))?;

        if state.isbn_taken(&input.isbn, Some(id)) {
            return Err(duplicate_isbn(&input.isbn));
        }

        let book = &mut state.books[index];
        book.replace_with(input, Utc::now());
        Ok(book.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let before = state.books.len();
        state.books.retain(|b| b.id != id);

        if state.books.len() == before {
            return Err(book_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl BorrowStore for MemoryStore {
    async fn borrow(&self, borrow: &Borrow) -> AppResult<BorrowOutcome> {
        let mut state = self.state.lock().await;

        let book = state
            .books
            .iter_mut()
            .find(|b| b.id == borrow.book)
            .ok_or_else(|| book_not_found(borrow.book))?;

        if book.copies < borrow.quantity {
            return Err(not_enough_copies(borrow.quantity, book.copies));
        }

        book.copies -= borrow.quantity;
        book.available = book.copies != 0;
        book.updated_at = borrow.created_at;
        let copies_left = book.copies;

        state.borrows.push(borrow.clone());

        Ok(BorrowOutcome {
            borrow: borrow.clone(),
            copies_left,
        })
    }

    async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        let state = self.state.lock().await;

        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for borrow in &state.borrows {
            *totals.entry(borrow.book).or_default() += i64::from(borrow.quantity);
        }

        // Ledger rows whose book is gone drop out, like an inner join
        let mut summary: Vec<BorrowSummary> = state
            .books
            .iter()
            .filter_map(|book| {
                totals.get(&book.id).map(|total| BorrowSummary {
                    book: BorrowedBook {
                        title: book.title.clone(),
                        isbn: book.isbn.clone(),
                    },
                    total_quantity: *total,
                })
            })
            .collect();

        summary.sort_by(|a, b| {
            a.book
                .title
                .cmp(&b.book.title)
                .then_with(|| a.book.isbn.cmp(&b.book.isbn))
        });

        Ok(summary)
    }
}
