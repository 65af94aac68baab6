//! MedTrack REST API server binary.
//!
//! Configuration comes from the environment (an optional `.env` file is read
//! first). See [`medtrack_api::Config`] for the recognised variables.

use medtrack_api::{app, AppState, Config, DatabaseLocation};
use medtrack_core::MedTrack;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // RUST_LOG wins over LOG_LEVEL.
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "medtrack_api={level},medtrack_core={level},tower_http=info",
            level = config.log_level
        ))
    })?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let records = match &config.database {
        DatabaseLocation::InMemory => {
            tracing::warn!("using an in-memory database; data is lost on exit");
            MedTrack::open_in_memory()?
        }
        DatabaseLocation::File(path) => {
            tracing::info!(path = %path.display(), "opening database");
            MedTrack::open(path)?
        }
    };

    let app = app(AppState::new(records), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        environment = %config.environment,
        cors_origin = ?config.cors_origin,
        "-- Starting MedTrack API on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
