//! In-process `books` table for tests and local demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use inventory_db::DbError;
use tokio::sync::Mutex;

use super::{BookStore, Connector};
use crate::modules::books::models::{Book, NewBook};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Book>,
    last_id: u32,
}

/// Hands out stores that share one table. Clones share it too.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    table: Arc<Mutex<Option<Table>>>,
    open: Arc<AtomicUsize>,
    refuse_with: Option<String>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose every `connect` fails with `message`.
    pub fn refusing(message: impl Into<String>) -> Self {
        Self {
            refuse_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Stores handed out and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Box<dyn BookStore>, DbError> {
        if let Some(message) = &self.refuse_with {
            return Err(DbError::Connect(message.clone()));
        }

        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryBookStore {
            table: Arc::clone(&self.table),
            open: Arc::clone(&self.open),
        }))
    }
}

/// A [`BookStore`] over the connector's shared table.
pub struct MemoryBookStore {
    table: Arc<Mutex<Option<Table>>>,
    open: Arc<AtomicUsize>,
}

fn missing_table() -> DbError {
    DbError::Query(sqlx::Error::Protocol(
        "Table 'books' doesn't exist".to_string(),
    ))
}

impl MemoryBookStore {
    async fn with_table<T>(&self, f: impl FnOnce(&mut Table) -> T) -> Result<T, DbError> {
        let mut guard = self.table.lock().await;
        let table = guard.as_mut().ok_or_else(missing_table)?;
        Ok(f(table))
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn bootstrap(&mut self) -> Result<(), DbError> {
        self.table.lock().await.get_or_insert_with(Table::default);
        Ok(())
    }

    async fn list_all(&mut self) -> Result<Vec<Book>, DbError> {
        self.with_table(|table| {
            let mut rows = table.rows.clone();
            rows.sort_by(|a, b| b.id.cmp(&a.id));
            rows
        })
        .await
    }

    async fn find(&mut self, id: u32) -> Result<Option<Book>, DbError> {
        self.with_table(|table| table.rows.iter().find(|row| row.id == id).cloned())
            .await
    }

    async fn insert(&mut self, book: &NewBook) -> Result<u32, DbError> {
        self.with_table(|table| {
            table.last_id += 1;
            table.rows.push(Book {
                id: table.last_id,
                title: book.title.clone(),
                author: book.author.clone(),
                year: book.year,
                created_at: Utc::now(),
            });
            table.last_id
        })
        .await
    }

    async fn update(&mut self, id: u32, book: &NewBook) -> Result<u64, DbError> {
        self.with_table(|table| match table.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.title = book.title.clone();
                row.author = book.author.clone();
                row.year = book.year;
                1
            }
            None => 0,
        })
        .await
    }

    async fn delete(&mut self, id: u32) -> Result<u64, DbError> {
        self.with_table(|table| {
            let before = table.rows.len();
            table.rows.retain(|row| row.id != id);
            (before - table.rows.len()) as u64
        })
        .await
    }

    async fn close(self: Box<Self>) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
