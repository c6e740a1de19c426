use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::connect;

/// Create an in-memory SQLite database with all migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    init_test_tracing();

    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is taken from the RUST_LOG environment variable and
/// defaults to WARN. Only the first call in a test binary installs the subscriber.
fn init_test_tracing() {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
