//! Book catalog storage.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    /// Price in cents to keep arithmetic exact.
    pub price_cents: u64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

/// Payload for creating a book; the id is allocated by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price_cents: u64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub synopsis: Option<String>,
}

/// Errors raised by catalog operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("book {0} not found")]
    NotFound(u64),

    #[error("book {0} already exists")]
    DuplicateId(u64),

    #[error("no id can be allocated after {0}")]
    IdOverflow(u64),

    #[error("failed to read seed file: {0}")]
    SeedIo(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    SeedParse(#[from] serde_json::Error),
}

/// Handle to the catalog store.
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Debug, Clone)]
pub struct Database {
    books: Arc<DashMap<u64, Book>>,
    next_id: Arc<AtomicU64>,
}

impl Database {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            books: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Create a store pre-populated with `books`.
    pub fn with_books(books: Vec<Book>) -> Result<Self, DbError> {
        let db = Self::new();
        for book in books {
            db.insert_existing(book)?;
        }
        Ok(db)
    }

    /// Open the store, loading the seed file when one is configured.
    pub fn open(seed_path: Option<&Path>) -> Result<Self, DbError> {
        let Some(path) = seed_path else {
            return Ok(Self::new());
        };

        let reader = BufReader::new(File::open(path)?);
        let books: Vec<Book> = serde_json::from_reader(reader)?;
        let db = Self::with_books(books)?;
        tracing::info!(path = %path.display(), books = db.len(), "Catalog seeded");
        Ok(db)
    }

    fn insert_existing(&self, book: Book) -> Result<(), DbError> {
        let id = book.id;
        if self.books.contains_key(&id) {
            return Err(DbError::DuplicateId(id));
        }
        let next = id.checked_add(1).ok_or(DbError::IdOverflow(id))?;
        self.books.insert(id, book);
        self.next_id.fetch_max(next, Ordering::SeqCst);
        Ok(())
    }

    /// All books, ordered by id.
    pub fn all(&self) -> Vec<Book> {
        let mut books: Vec<Book> = self.books.iter().map(|r| r.value().clone()).collect();
        books.sort_by_key(|b| b.id);
        books
    }

    /// Featured books, ordered by id.
    pub fn featured(&self) -> Vec<Book> {
        self.all().into_iter().filter(|b| b.featured).collect()
    }

    pub fn get(&self, id: u64) -> Result<Book, DbError> {
        self.books
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(DbError::NotFound(id))
    }

    /// Insert a new book and return it with its allocated id.
    pub fn insert(&self, new: NewBook) -> Result<Book, DbError> {
        let id = self
            .next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map_err(DbError::IdOverflow)?;
        let book = Book {
            id,
            title: new.title,
            author: new.author,
            price_cents: new.price_cents,
            stock: new.stock,
            featured: new.featured,
            synopsis: new.synopsis,
        };
        self.books.insert(id, book.clone());
        Ok(book)
    }

    /// Set the stock level of a book.
    pub fn set_stock(&self, id: u64, stock: u32) -> Result<Book, DbError> {
        let mut entry = self.books.get_mut(&id).ok_or(DbError::NotFound(id))?;
        entry.stock = stock;
        Ok(entry.value().clone())
    }

    pub fn remove(&self, id: u64) -> Result<Book, DbError> {
        self.books
            .remove(&id)
            .map(|(_, book)| book)
            .ok_or(DbError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
