//! Serve command - runs the escrow API server.
//!
//! Brings up Postgres (migrating on connect), Redis and the attachment
//! blob store, then serves the router until the process is stopped.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, FileStore};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    let db = Arc::new(Database::connect(&config).await);
    tracing::info!("Database connected, schema current");

    // Sessions stay in Postgres; Redis carries the payment-method cache
    // and the rate-limit counters.
    let cache = Arc::new(Cache::connect(&config).await);
    tracing::info!("Redis connected");

    let files = FileStore::new(&config.upload_dir);
    files.ensure_root().await?;
    tracing::info!("Attachment store ready at {}", config.upload_dir);

    let app_state = AppState::from_config(db, cache, files, config);
    let app = create_router(app_state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Escrow API listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
