use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inventory_app::{BookStore, Connector, MemoryConnector, MySqlConnector};
use inventory_kernel::settings::Settings;
use inventory_kernel::ModuleRegistry;

#[derive(Debug, Parser)]
#[command(name = "inventory-cli", version, about = "Operate the book inventory")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the inventory page
    Serve {
        /// Keep books in process memory instead of MySQL
        #[arg(long)]
        memory: bool,
    },
    /// Create missing tables and exit
    Bootstrap,
    /// Print every book, newest first
    List,
    /// Print the resolved settings with the password masked
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load inventory settings")?;
    inventory_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve { memory } => serve(&settings, memory).await,
        Command::Bootstrap => bootstrap(&settings).await,
        Command::List => list(&settings).await,
        Command::Config => print_config(settings),
    }
}

async fn serve(settings: &Settings, memory: bool) -> anyhow::Result<()> {
    let connector: Arc<dyn Connector> = if memory {
        tracing::warn!("serving from process memory; books are lost on exit");
        Arc::new(MemoryConnector::new())
    } else {
        Arc::new(MySqlConnector::new(settings.database.clone()))
    };

    inventory_app::serve(settings, connector).await
}

async fn bootstrap(settings: &Settings) -> anyhow::Result<()> {
    let mut registry = ModuleRegistry::new();
    inventory_app::modules::register_all(
        &mut registry,
        Arc::new(MySqlConnector::new(settings.database.clone())),
    );

    let migrations: Vec<_> = registry
        .collect_migrations()
        .into_iter()
        .map(|(module, migration)| {
            tracing::info!(module = %module, id = migration.id, "queued migration");
            migration
        })
        .collect();

    let mut conn = inventory_db::connect(&settings.database)
        .await
        .context("Database connection failed")?;
    let applied = inventory_db::apply_migrations(&mut conn, &migrations).await;
    inventory_db::close(conn).await;
    applied?;

    println!(
        "applied {} migration(s) to {}",
        migrations.len(),
        settings.database.name
    );
    Ok(())
}

async fn list(settings: &Settings) -> anyhow::Result<()> {
    let mut store = MySqlConnector::new(settings.database.clone())
        .connect()
        .await
        .context("Database connection failed")?;
    let books = match store.bootstrap().await {
        Ok(()) => store.list_all().await,
        Err(e) => Err(e),
    };
    store.close().await;

    for book in books? {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            book.id,
            book.title,
            book.author,
            book.year,
            book.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn print_config(mut settings: Settings) -> anyhow::Result<()> {
    if !settings.database.password.is_empty() {
        settings.database.password = "********".to_string();
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_memory_flag() {
        let cli = Cli::try_parse_from(["inventory-cli", "serve", "--memory"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { memory: true }));
    }

    #[test]
    fn parses_plain_subcommands() {
        let cli = Cli::try_parse_from(["inventory-cli", "bootstrap"]).unwrap();
        assert!(matches!(cli.command, Command::Bootstrap));

        let cli = Cli::try_parse_from(["inventory-cli", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["inventory-cli", "migrate-down"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
