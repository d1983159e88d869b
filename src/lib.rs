//! Book inventory application library
//!
//! Hosts the `books` module and the server bootstrap shared by the binary and the CLI.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use inventory_kernel::settings::Settings;
use inventory_kernel::{InitCtx, ModuleRegistry};

pub use modules::books::store::{BookStore, Connector, MemoryConnector, MySqlConnector};

/// Register modules, run their lifecycle around the HTTP server, and stop them on shutdown.
pub async fn serve(settings: &Settings, connector: Arc<dyn Connector>) -> anyhow::Result<()> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, connector);

    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("inventory bootstrap complete");

    let served = inventory_http::start_server(&registry, settings)
        .await
        .context("HTTP server stopped with an error");

    registry.stop_modules().await?;
    served
}
