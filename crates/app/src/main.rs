use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let server_config = settings.server;
    let db = match connect_database(&server_config).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err);
        }
    };

    let mut builder = engine::Engine::builder().database(db.clone());
    if let Some(ms) = server_config.operation_timeout_ms {
        builder = builder.operation_timeout(Duration::from_millis(ms));
    }
    let engine = builder.build().await?;

    let limiter = server::RateLimiter::new(
        server_config.rate_limit.requests,
        Duration::from_secs(server_config.rate_limit.window_secs),
    );
    let bind = server_config.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    if let Err(err) = server::run(engine, db, limiter, (bind.as_str(), server_config.port)).await {
        tracing::error!("server failed: {err}");
        return Err(err.into());
    }

    Ok(())
}

/// Connect to the configured store and bring its schema up to date.
async fn connect_database(
    config: &settings::Server,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let mut options = ConnectOptions::new(config.database.url());
    options.sqlx_logging(false);
    if let Some(max) = config.max_connections {
        options.max_connections(max);
    }

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
