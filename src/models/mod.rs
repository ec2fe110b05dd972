//! Data models for the library API

pub mod book;
pub mod borrow;
pub mod enums;

// Re-export commonly used types
pub use book::{Book, BookInput, BookListParams, BookPage, BookQuery, BookSortField, PageMeta};
pub use borrow::{Borrow, BorrowOutcome, BorrowSummary, BorrowedBook, CreateBorrow};
pub use enums::{Genre, SortOrder};
