use std::sync::Arc;

use anyhow::Context;
use inventory_app::MySqlConnector;
use inventory_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load inventory settings")?;
    inventory_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db_host = %settings.database.host,
        db_name = %settings.database.name,
        "inventory-app bootstrap starting"
    );

    let connector = Arc::new(MySqlConnector::new(settings.database.clone()));
    inventory_app::serve(&settings, connector).await
}
