//! MySQL connection factory and idempotent schema bootstrap.
//!
//! Each request opens its own connection with [`connect`] and closes it when the
//! request finishes; there is no pool and no process-wide handle.

use inventory_kernel::settings::DatabaseSettings;
use inventory_kernel::Migration;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Executor};
use thiserror::Error;

/// Storage failures surfaced to the request layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The server could not be reached or refused the credentials.
    #[error("{0}")]
    Connect(String),

    /// A bootstrap statement failed after the connection opened.
    #[error("migration {id} failed: {source}")]
    Migration {
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Query(#[from] sqlx::Error),
}

impl DbError {
    /// True when the failure happened while opening the connection or ensuring the schema.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, DbError::Connect(_) | DbError::Migration { .. })
    }
}

/// Build connect options from settings. Uses the `utf8mb4` charset.
pub fn connect_options(settings: &DatabaseSettings) -> MySqlConnectOptions {
    let options = MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .database(&settings.name)
        .charset("utf8mb4");

    if settings.password.is_empty() {
        options
    } else {
        options.password(&settings.password)
    }
}

/// Open a fresh connection. No retry.
pub async fn connect(settings: &DatabaseSettings) -> Result<MySqlConnection, DbError> {
    tracing::debug!(
        target: "inventory-db",
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        "opening connection"
    );

    connect_options(settings)
        .connect()
        .await
        .map_err(|e| DbError::Connect(e.to_string()))
}

/// Send the protocol quit and wait for the server to acknowledge it. Failures are logged.
pub async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(target: "inventory-db", error = %e, "failed to close connection");
    }
}

/// Run every migration in order. Statements must be idempotent.
pub async fn apply_migrations(
    conn: &mut MySqlConnection,
    migrations: &[Migration],
) -> Result<(), DbError> {
    for migration in migrations {
        tracing::trace!(target: "inventory-db", id = migration.id, "applying migration");

        (&mut *conn)
            .execute(migration.up)
            .await
            .map_err(|source| DbError::Migration {
                id: migration.id,
                source,
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_errors_are_connection_failures() {
        let error = DbError::Connect("Access denied for user 'root'@'localhost'".to_string());
        assert!(error.is_connection_failure());
        assert_eq!(
            error.to_string(),
            "Access denied for user 'root'@'localhost'"
        );
    }

    #[test]
    fn migration_errors_are_connection_failures() {
        let error = DbError::Migration {
            id: "001_create_books",
            source: sqlx::Error::RowNotFound,
        };
        assert!(error.is_connection_failure());
        assert!(error.to_string().starts_with("migration 001_create_books failed"));
    }

    #[test]
    fn query_errors_are_not_connection_failures() {
        let error = DbError::from(sqlx::Error::RowNotFound);
        assert!(!error.is_connection_failure());
    }

    #[tokio::test]
    async fn unreachable_server_reports_connect_error() {
        let settings = DatabaseSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..DatabaseSettings::default()
        };

        let error = connect(&settings).await.unwrap_err();
        assert!(matches!(error, DbError::Connect(_)));
    }
}
