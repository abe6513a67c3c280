//! Catalog operations sitting between the HTTP handlers and the store.

use std::sync::Arc;

use serde_json::json;
use shelf_http::error::AppError;
use thiserror::Error;

use super::models::{Book, BookId, BookRequest};
use super::store::BookStore;
use super::validation::{self, FieldViolation, Validator};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Book {0} not found")]
    NotFound(BookId),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<Vec<FieldViolation>> for CatalogError {
    fn from(violations: Vec<FieldViolation>) -> Self {
        CatalogError::Validation(violations)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(violations) => {
                let message = format!("{} field(s) failed validation", violations.len());
                let details = violations
                    .into_iter()
                    .map(|v| json!({ "field": v.field, "error": v.message }))
                    .collect();
                AppError::validation(details, message)
            }
            CatalogError::NotFound(id) => AppError::not_found(format!("Book {} not found", id)),
            CatalogError::Store(e) => AppError::Internal(e),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// The book catalog service.
pub struct BookCatalog {
    store: Arc<dyn BookStore>,
}

impl BookCatalog {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.store.list().await?)
    }

    pub async fn count(&self) -> CatalogResult<usize> {
        Ok(self.store.list().await?.len())
    }

    pub async fn get(&self, id: i64) -> CatalogResult<Book> {
        let id = checked_id(id)?;
        self.store
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Books whose rating equals `rating`, in collection order.
    pub async fn by_rating(&self, rating: i64) -> CatalogResult<Vec<Book>> {
        let rating = validation::check_range("book_rating", rating, validation::RATING)?;
        self.filtered(|book| i64::from(book.rating) == rating).await
    }

    /// Books published in `year`, in collection order.
    pub async fn by_published_date(&self, year: i64) -> CatalogResult<Vec<Book>> {
        let year =
            validation::check_range("publish_date", year, validation::PUBLISHED_YEAR_FILTER)?;
        self.filtered(|book| book.published_date.map(i64::from) == Some(year))
            .await
    }

    async fn filtered<F>(&self, keep: F) -> CatalogResult<Vec<Book>>
    where
        F: Fn(&Book) -> bool,
    {
        let mut books = self.store.list().await?;
        books.retain(|book| keep(book));
        Ok(books)
    }

    /// Validate and append a new book; any client-supplied id is ignored.
    pub async fn create(&self, request: BookRequest) -> CatalogResult<Book> {
        let new_book = request.into_new_book()?;
        let book = self.store.insert(new_book).await?;
        tracing::info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    /// Replace the book identified by `request.id` wholesale.
    pub async fn update(&self, request: BookRequest) -> CatalogResult<Book> {
        let book = request.into_book()?;
        let replaced = self.store.replace(book.clone()).await?;
        if replaced == 0 {
            return Err(CatalogError::NotFound(book.id));
        }
        tracing::info!(book_id = book.id, replaced, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> CatalogResult<Book> {
        let id = checked_id(id)?;
        let removed = self
            .store
            .remove_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        tracing::info!(book_id = id, "Book deleted successfully");
        Ok(removed)
    }
}

fn checked_id(id: i64) -> Result<BookId, Vec<FieldViolation>> {
    let mut validator = Validator::new();
    let id = validator.positive_id("book_id", id);
    validator.finish()?;
    id.ok_or_else(|| vec![FieldViolation::new("book_id", "field required")])
}
