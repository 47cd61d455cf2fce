use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marginalia::{config, create_app, db, registry, run_migrations, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenv::dotenv().ok();

    // Parse command line arguments
    let args = config::CliArgs::parse();

    // Log to stdout and to a daily rolling file. The guard keeps the
    // background writer alive until shutdown so buffered logs get flushed.
    let file_appender = tracing_appender::rolling::daily("./logs", "marginalia.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    // Resolve the configuration from defaults, config file, and arguments
    let config = config::get_config(args);

    // Initialize the database pool and apply pending migrations
    let pool = Arc::new(db::init_pool(&config.database_url));
    {
        let mut conn = pool.get()?;
        run_migrations(&mut conn);
    }

    // Resolve the engine configuration against the kinds table. An unknown
    // name or an ambiguous registration aborts startup.
    let registry = {
        let mut conn = pool.get()?;
        Arc::new(registry::Registry::ready_named(
            &mut conn,
            &config.engine_config,
        )?)
    };
    info!("Resolved engine configuration: {}", registry.config_name());

    // Build the application router
    let app = create_app(AppState::new(pool, registry));

    // Run the server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
