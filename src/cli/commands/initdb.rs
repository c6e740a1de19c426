use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, trace};

/// Applies all pending migrations, creating the `role` and `profile` tables.
pub async fn init_database(db: &DatabaseConnection) -> Result<()> {
    trace!("Entering init_database function");
    info!("Running database migrations");

    match Migrator::up(db, None).await {
        Ok(_) => {
            info!("Database migrations completed successfully");
            debug!("All pending migrations have been applied");
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            return Err(e.into());
        }
    }

    info!("Database initialization completed successfully!");
    trace!("init_database function completed");
    Ok(())
}
