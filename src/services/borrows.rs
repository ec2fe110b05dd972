//! Borrow workflow service

use crate::{
    error::AppResult,
    models::{Borrow, BorrowSummary, CreateBorrow},
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowService {
    repository: Repository,
}

impl BorrowService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow copies of a book.
    ///
    /// The copy check, the decrement, the availability update and the ledger
    /// insert are committed together by the store; a rejected request leaves
    /// both the catalog and the ledger untouched.
    pub async fn borrow(&self, request: CreateBorrow) -> AppResult<Borrow> {
        let borrow = Borrow::new(&request);

        match self.repository.borrows.borrow(&borrow).await {
            Ok(outcome) => {
                tracing::info!(
                    book_id = %outcome.borrow.book,
                    quantity = outcome.borrow.quantity,
                    remaining = outcome.copies_left,
                    "Book borrowed"
                );
                if outcome.copies_left == 0 {
                    tracing::info!(book_id = %outcome.borrow.book, "Last copies borrowed, book now unavailable");
                }
                Ok(outcome.borrow)
            }
            Err(e) => {
                tracing::debug!(book_id = %request.book, quantity = request.quantity, "Borrow rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Total borrowed quantity per book
    pub async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        self.repository.borrows.summary().await
    }
}
