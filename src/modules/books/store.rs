//! Storage seam for the catalog.
//!
//! Request handling only talks to [`BookStore`]; the in-memory backend keeps
//! the whole collection behind one `RwLock` so readers never see a half-applied
//! mutation.

use async_trait::async_trait;
use shelf_kernel::settings::IdPolicy;
use tokio::sync::RwLock;

use super::models::{sample_books, Book, BookId, NewBook};

#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books in insertion order
    async fn list(&self) -> anyhow::Result<Vec<Book>>;

    /// First book with the given id
    async fn get_by_id(&self, id: BookId) -> anyhow::Result<Option<Book>>;

    /// Assign an id to `book`, append it, and return the stored record
    async fn insert(&self, book: NewBook) -> anyhow::Result<Book>;

    /// Overwrite every book whose id matches `book.id`; returns how many were replaced
    async fn replace(&self, book: Book) -> anyhow::Result<usize>;

    /// Remove the first book with the given id
    async fn remove_by_id(&self, id: BookId) -> anyhow::Result<Option<Book>>;
}

/// Process-local store; all state is lost on restart.
pub struct InMemoryBookStore {
    books: RwLock<Vec<Book>>,
    id_policy: IdPolicy,
}

impl InMemoryBookStore {
    /// Empty store
    pub fn new(id_policy: IdPolicy) -> Self {
        Self::with_books(id_policy, Vec::new())
    }

    /// Store pre-populated with the sample books
    pub fn seeded(id_policy: IdPolicy) -> Self {
        Self::with_books(id_policy, sample_books())
    }

    pub fn with_books(id_policy: IdPolicy, books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
            id_policy,
        }
    }

    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }
}

/// Id the next inserted book receives under `policy`.
pub fn next_id(books: &[Book], policy: IdPolicy) -> BookId {
    let base = match policy {
        IdPolicy::MaxPlusOne => books.iter().map(|book| book.id).max(),
        IdPolicy::LastPlusOne => books.last().map(|book| book.id),
    };
    base.map_or(1, |id| id + 1)
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self) -> anyhow::Result<Vec<Book>> {
        Ok(self.books.read().await.clone())
    }

    async fn get_by_id(&self, id: BookId) -> anyhow::Result<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn insert(&self, book: NewBook) -> anyhow::Result<Book> {
        let mut books = self.books.write().await;
        let book = book.with_id(next_id(&books, self.id_policy));
        books.push(book.clone());
        Ok(book)
    }

    async fn replace(&self, book: Book) -> anyhow::Result<usize> {
        let mut books = self.books.write().await;
        let mut replaced = 0;
        for slot in books.iter_mut().filter(|slot| slot.id == book.id) {
            *slot = book.clone();
            replaced += 1;
        }
        Ok(replaced)
    }

    async fn remove_by_id(&self, id: BookId) -> anyhow::Result<Option<Book>> {
        let mut books = self.books.write().await;
        Ok(books
            .iter()
            .position(|book| book.id == id)
            .map(|index| books.remove(index)))
    }
}
