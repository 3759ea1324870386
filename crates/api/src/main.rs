use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use image_slider_api::app::{create_router, AppState};
use image_slider_api::config::Config;
use image_slider_api::middleware;
use image_slider_api::services::lifecycle;

/// Image slider service: storefront carousel and its admin page.
#[derive(Parser)]
#[command(name = "image-slider")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Create tables, register hooks, write default settings and seed sample slides
    Install,
    /// Delete all slides and images, drop tables, unregister hooks and remove settings
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting image slider v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::connect(&config.pool_settings()).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let state = AppState::new(config, pool);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Install => {
            let report = lifecycle::install(&state).await?;
            info!(
                hooks = report.hooks_registered,
                samples = report.samples_seeded,
                "Install finished"
            );
        }
        Commands::Uninstall => {
            let report = lifecycle::uninstall(&state).await?;
            info!(
                slides = report.slides_deleted,
                images = report.images_removed,
                settings = report.settings_deleted,
                "Uninstall finished"
            );
        }
        Commands::Serve => serve(state).await?,
    }

    Ok(())
}

async fn serve(state: AppState) -> Result<()> {
    if state.config.slider.auto_install && !lifecycle::is_installed(&state).await? {
        info!("Module tables missing, installing");
        lifecycle::install(&state).await?;
    }
    state.images.ensure_dir().await?;

    let addr = state.config.socket_addr()?;
    let app = create_router(state);

    // Start server
    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
