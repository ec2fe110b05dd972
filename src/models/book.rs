//! Book (catalog entry) model and related types.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::{cmp::Ordering, fmt, str::FromStr};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Genre, SortOrder};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Book as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub isbn: String,
    pub description: String,
    pub copies: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new catalog entry from validated input
    pub fn new(input: BookInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            author: input.author,
            genre: input.genre,
            isbn: input.isbn,
            description: input.description,
            copies: input.copies,
            available: input.available,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field, keeping identity and creation time
    pub fn replace_with(&mut self, input: &BookInput, now: DateTime<Utc>) {
        self.title = input.title.clone();
        self.author = input.author.clone();
        self.genre = input.genre;
        self.isbn = input.isbn.clone();
        self.description = input.description.clone();
        self.copies = input.copies;
        self.available = input.available;
        self.updated_at = now;
    }
}

/// Raw `books` row; genre is stored as text
#[derive(Debug, FromRow)]
pub struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub description: String,
    pub copies: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let genre = row
            .genre
            .parse::<Genre>()
            .map_err(|e| AppError::Internal(format!("book {}: {}", row.id, e)))?;

        Ok(Book {
            id: row.id,
            title: row.title,
            author: row.author,
            genre,
            isbn: row.isbn,
            description: row.description,
            copies: row.copies,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn default_available() -> bool {
    true
}

fn trimmed<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(de).map(|s| s.trim().to_string())
}

/// Create / replace book request body
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, message = "Author must be at least 3 characters"))]
    pub author: String,
    #[serde(default)]
    pub genre: Genre,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 10, message = "ISBN must be at least 10 characters"))]
    pub isbn: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[validate(range(min = 1, message = "Copies must be at least 1"))]
    pub copies: i32,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Treats a missing or blank query value as absent
fn empty_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Sortable book fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum BookSortField {
    Title,
    Author,
    Genre,
    Isbn,
    Copies,
    Available,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl BookSortField {
    pub fn column(&self) -> &'static str {
        match self {
            BookSortField::Title => "title",
            BookSortField::Author => "author",
            BookSortField::Genre => "genre",
            BookSortField::Isbn => "isbn",
            BookSortField::Copies => "copies",
            BookSortField::Available => "available",
            BookSortField::CreatedAt => "created_at",
            BookSortField::UpdatedAt => "updated_at",
        }
    }

    /// Ascending comparison of two books on this field
    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self {
            BookSortField::Title => a.title.cmp(&b.title),
            BookSortField::Author => a.author.cmp(&b.author),
            BookSortField::Genre => a.genre.as_str().cmp(b.genre.as_str()),
            BookSortField::Isbn => a.isbn.cmp(&b.isbn),
            BookSortField::Copies => a.copies.cmp(&b.copies),
            BookSortField::Available => a.available.cmp(&b.available),
            BookSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            BookSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for BookSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(BookSortField::Title),
            "author" => Ok(BookSortField::Author),
            "genre" => Ok(BookSortField::Genre),
            "isbn" => Ok(BookSortField::Isbn),
            "copies" => Ok(BookSortField::Copies),
            "available" => Ok(BookSortField::Available),
            "createdAt" => Ok(BookSortField::CreatedAt),
            "updatedAt" => Ok(BookSortField::UpdatedAt),
            other => Err(format!("cannot sort by `{}`", other)),
        }
    }
}

/// Book list query string
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Only books of this genre
    #[serde(default, deserialize_with = "empty_as_none")]
    pub filter: Option<Genre>,
    /// Sort direction (default: asc)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort: Option<SortOrder>,
    /// Field to sort on (default: createdAt)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<BookSortField>,
    /// Page size (default: 10)
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    /// Page number, starting at 1
    #[validate(range(min = 1, max = 1_000_000, message = "Page must be between 1 and 1000000"))]
    pub page: Option<i64>,
}

impl BookQuery {
    /// Fill in defaults
    pub fn resolve(&self) -> BookListParams {
        BookListParams {
            genre: self.filter,
            sort_by: self.sort_by.unwrap_or_default(),
            order: self.sort.unwrap_or_default(),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            page: self.page.unwrap_or(1).max(1),
        }
    }
}

/// Resolved list parameters handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct BookListParams {
    pub genre: Option<Genre>,
    pub sort_by: BookSortField,
    pub order: SortOrder,
    pub limit: i64,
    pub page: i64,
}

impl BookListParams {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned next to list results
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_pages: i64,
    pub total_items: i64,
    pub current_page: i64,
    pub total_items_per_page: i64,
}

impl PageMeta {
    pub fn new(total_items: i64, params: &BookListParams) -> Self {
        Self {
            total_pages: (total_items + params.limit - 1) / params.limit,
            total_items,
            current_page: params.page,
            total_items_per_page: params.limit,
        }
    }
}

/// One page of books
#[derive(Debug)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub meta: PageMeta,
}
