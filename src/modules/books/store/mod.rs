//! Storage client for the `books` table.
//!
//! A [`Connector`] hands out one [`BookStore`] per request. The store owns its
//! connection until [`BookStore::close`] hands it back to the server.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use inventory_db::DbError;

use super::models::{Book, NewBook};

pub use memory::MemoryConnector;
pub use mysql::MySqlConnector;

/// Operations the request state machine needs from storage.
#[async_trait]
pub trait BookStore: Send {
    /// Create the `books` table if it is missing.
    async fn bootstrap(&mut self) -> Result<(), DbError>;

    /// Every row, highest id first.
    async fn list_all(&mut self) -> Result<Vec<Book>, DbError>;

    async fn find(&mut self, id: u32) -> Result<Option<Book>, DbError>;

    /// Insert a row and return its assigned id.
    async fn insert(&mut self, book: &NewBook) -> Result<u32, DbError>;

    /// Overwrite title, author and year. Returns rows affected; zero is not an error.
    async fn update(&mut self, id: u32, book: &NewBook) -> Result<u64, DbError>;

    /// Returns rows affected; zero is not an error.
    async fn delete(&mut self, id: u32) -> Result<u64, DbError>;

    /// End the session. Failures are logged, never returned.
    async fn close(self: Box<Self>) {}
}

/// Opens a fresh [`BookStore`] for a single request.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn BookStore>, DbError>;
}
