use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bookmarks_api::app::{self, AppState};
use bookmarks_api::auth::JwtIdentity;
use bookmarks_api::config::{self, AppConfig, StorageBackend};
use bookmarks_api::database::{DatabaseManager, MemoryStore, PgStore};
use bookmarks_api::is_production;

#[derive(Parser)]
#[command(name = "bookmarks-api", version, about = "Multi-user bookmark service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Interface to bind, overrides SERVER_HOST
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides SERVER_PORT / PORT
        #[arg(long)]
        port: Option<u16>,
        /// memory or postgres, overrides STORAGE_BACKEND
        #[arg(long)]
        storage: Option<StorageBackend>,
    },
    /// Create the Postgres tables and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL and JWT_SECRET are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = config::config().clone();

    match cli.command {
        Some(Commands::Migrate) => migrate(&config).await,
        Some(Commands::Serve { host, port, storage }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(storage) = storage {
                config.storage.backend = storage;
            }
            serve(config).await
        }
        None => serve(config).await,
    }
}

async fn migrate(config: &AppConfig) -> Result<()> {
    let pool = DatabaseManager::connect(&config.storage)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgStore::new(pool);
    store.migrate().await.context("failed to apply schema")?;
    store.close().await;
    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Starting Bookmarks API in {:?} mode", config.environment);

    let identity = Arc::new(
        JwtIdentity::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)
            .context("invalid JWT configuration (JWT_SECRET, SECURITY_JWT_EXPIRY_HOURS)")?,
    );

    let mut pg_store = None;
    let state = match config.storage.backend {
        StorageBackend::Memory => {
            if is_production!() {
                warn!("Using the in-memory store in production; data is lost on restart");
            }
            AppState::new(Arc::new(MemoryStore::new()), identity)
        }
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.storage)
                .await
                .context("failed to connect to Postgres")?;
            let store = Arc::new(PgStore::new(pool));
            if config.storage.run_migrations {
                store.migrate().await.context("failed to apply schema")?;
            }
            pg_store = Some(store.clone());
            AppState::new(store, identity)
        }
    };
    info!("Using {} store", state.store.backend_name());

    let app = app::router(state, &config.api, &config.security);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Bookmarks API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(store) = pg_store {
        store.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
