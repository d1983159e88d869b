pub mod handler;
pub mod models;
pub mod routes;
pub mod store;
pub mod view;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use inventory_kernel::{InitCtx, Migration, Module};

use store::Connector;

/// The single-page book inventory
pub struct BooksModule {
    connector: Arc<dyn Connector>,
}

impl BooksModule {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

/// Schema for the `books` table. Runs on every request.
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id INT(11) UNSIGNED AUTO_INCREMENT PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                author VARCHAR(255) NOT NULL,
                year INT(4) NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
    }]
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            host = %ctx.settings.database.host,
            database = %ctx.settings.database.name,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.connector))
    }

    fn migrations(&self) -> Vec<Migration> {
        migrations()
    }

    /// Check the database once. Failure is only logged; requests report their own.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let reachable = match self.connector.connect().await {
            Ok(mut store) => {
                let result = store.bootstrap().await;
                store.close().await;
                result
            }
            Err(e) => Err(e),
        };

        match reachable {
            Ok(()) => tracing::info!(module = self.name(), "books module started"),
            Err(e) => tracing::warn!(
                module = self.name(),
                error = %e,
                "books module started without a reachable database"
            ),
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(connector: Arc<dyn Connector>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(connector))
}
