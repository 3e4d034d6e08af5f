use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use football_shop::cli::{Cli, Commands, ServeArgs};
use football_shop::config::{AppConfig, StoreBackend};
use football_shop::database::{seed, DatabaseManager, PgStore};
use football_shop::render::Renderer;
use football_shop::routes;
use football_shop::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = football_shop::config::config().clone();
    tracing::info!("Starting football-shop in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            args.apply(&mut config);
            serve(config).await
        }
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            tracing::info!("Migrations applied");
            DatabaseManager::close(&pool).await;
            Ok(())
        }
        Commands::Seed => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            seed::seed_if_empty(&PgStore::new(pool.clone())).await?;
            DatabaseManager::close(&pool).await;
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SESSION_SECRET must be set outside development");
    }

    let renderer = Renderer::new().context("failed to load templates")?;
    let state = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            AppState::with_pg_store(config, PgStore::new(pool), renderer)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            AppState::with_memory_store(config, renderer)
        }
    };

    if state.config.catalog.seed_sample_items {
        seed::seed_if_empty(state.items.as_ref()).await?;
    }

    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Football shop listening on http://{}", bind_addr);
    axum::serve(listener, routes::app(state)).await?;
    Ok(())
}
