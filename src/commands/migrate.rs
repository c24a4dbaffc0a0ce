//! Migration subcommand.
//!
//! Manual control over the escrow ledger schema. `up` applies whatever is
//! pending (including the payment-method seed migration, so a fresh
//! install has the USDT TRC20 directory entry); `fresh` drops every table
//! first and loses all escrow and audit data.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // The serve path migrates on connect; here the caller decides.
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            tracing::info!("Applying pending migrations");
            db.run_migrations()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            tracing::info!("Schema is current");
        }
        MigrateAction::Down => {
            tracing::info!("Rolling back the most recent migration");
            db.rollback_migration()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            tracing::info!("Rollback done");
        }
        MigrateAction::Status => {
            let status = db
                .migration_status()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            let applied = status.iter().filter(|(_, applied)| *applied).count();
            for (name, applied) in &status {
                println!(
                    "{:<55} {}",
                    name,
                    if *applied { "applied" } else { "pending" }
                );
            }
            println!("{} applied, {} pending", applied, status.len() - applied);
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping all tables and re-running every migration; escrow, audit and session data will be lost");
            db.fresh_migrations()
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
            tracing::info!("Fresh schema ready, payment-method seed re-applied");
        }
    }

    Ok(())
}
