use async_trait::async_trait;
use inventory_db::DbError;
use inventory_kernel::settings::DatabaseSettings;
use sqlx::mysql::MySqlConnection;

use super::{BookStore, Connector};
use crate::modules::books::{
    self as books,
    models::{Book, NewBook},
};

/// Connects to MySQL with the configured credentials on every call.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    settings: DatabaseSettings,
}

impl MySqlConnector {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self) -> Result<Box<dyn BookStore>, DbError> {
        let conn = inventory_db::connect(&self.settings).await?;
        Ok(Box::new(MySqlBookStore { conn }))
    }
}

/// A [`BookStore`] backed by one MySQL connection.
pub struct MySqlBookStore {
    conn: MySqlConnection,
}

#[async_trait]
impl BookStore for MySqlBookStore {
    async fn bootstrap(&mut self) -> Result<(), DbError> {
        inventory_db::apply_migrations(&mut self.conn, &books::migrations()).await
    }

    async fn list_all(&mut self) -> Result<Vec<Book>, DbError> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, year, created_at FROM books ORDER BY id DESC",
        )
        .fetch_all(&mut self.conn)
        .await?;

        Ok(rows)
    }

    async fn find(&mut self, id: u32) -> Result<Option<Book>, DbError> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, year, created_at FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut self.conn)
        .await?;

        Ok(book)
    }

    async fn insert(&mut self, book: &NewBook) -> Result<u32, DbError> {
        let result = sqlx::query("INSERT INTO books (title, author, year) VALUES (?, ?, ?)")
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.year)
            .execute(&mut self.conn)
            .await?;

        u32::try_from(result.last_insert_id())
            .map_err(|e| DbError::Query(sqlx::Error::Decode(Box::new(e))))
    }

    async fn update(&mut self, id: u32, book: &NewBook) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE books SET title = ?, author = ?, year = ? WHERE id = ?")
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.year)
            .bind(id)
            .execute(&mut self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&mut self, id: u32) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn close(self: Box<Self>) {
        let Self { conn } = *self;
        inventory_db::close(conn).await;
    }
}

#[cfg(test)]
mod tests {
    //! Run against a live server with `cargo test -- --ignored`; the `DB_*`
    //! variables select it.

    use super::*;

    async fn live_store() -> Box<dyn BookStore> {
        let settings = DatabaseSettings::default().overlay_env(None).unwrap();
        let mut store = MySqlConnector::new(settings).connect().await.unwrap();
        store.bootstrap().await.unwrap();
        store
    }

    fn new_book(title: &str, year: i32) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Test Author".to_string(),
            year,
        }
    }

    #[tokio::test]
    #[ignore = "requires a MySQL server"]
    async fn bootstrap_twice_keeps_rows() {
        let mut store = live_store().await;
        let id = store.insert(&new_book("Bootstrap", 2001)).await.unwrap();

        store.bootstrap().await.unwrap();
        assert!(store.find(id).await.unwrap().is_some());

        store.delete(id).await.unwrap();
        store.close().await;
    }

    #[tokio::test]
    #[ignore = "requires a MySQL server"]
    async fn insert_list_update_delete() {
        let mut store = live_store().await;

        let first = store.insert(&new_book("First", 1999)).await.unwrap();
        let second = store.insert(&new_book("Second", 2000)).await.unwrap();
        assert!(second > first);

        let ids: Vec<u32> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|book| book.id)
            .filter(|id| *id == first || *id == second)
            .collect();
        assert_eq!(ids, vec![second, first]);

        let before = store.find(first).await.unwrap().unwrap();
        let affected = store
            .update(first, &new_book("First, revised", 1998))
            .await
            .unwrap();
        let after = store.find(first).await.unwrap().unwrap();
        assert_eq!(affected, 1);
        assert_eq!(after.title, "First, revised");
        assert_eq!(after.year, 1998);
        assert_eq!(after.created_at, before.created_at);

        assert_eq!(store.delete(first).await.unwrap(), 1);
        assert_eq!(store.delete(first).await.unwrap(), 0);
        assert!(store.find(first).await.unwrap().is_none());

        store.delete(second).await.unwrap();
        store.close().await;
    }

    #[tokio::test]
    #[ignore = "requires a MySQL server"]
    async fn missing_row_update_affects_nothing() {
        let mut store = live_store().await;
        assert_eq!(
            store.update(u32::MAX, &new_book("Ghost", 1)).await.unwrap(),
            0
        );
        store.close().await;
    }
}
