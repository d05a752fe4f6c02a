//! Cadence Storage
//!
//! `SQLite` persistence for the playback snapshot and playback preferences.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each table group owns its own queries
//!   ([`playback_state`], [`settings`])
//! - **Snapshot Replacement**: a save replaces the whole snapshot in one
//!   transaction
//! - [`SqlitePlaybackStore`] adapts the slices to
//!   [`cadence_core::PlaybackStore`]
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::PlaybackStore;
//! use cadence_storage::{create_pool, run_migrations, SqlitePlaybackStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cadence.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqlitePlaybackStore::new(pool);
//! let settings = store.load_settings().await?;
//! let snapshot = store.load_snapshot().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod store;

// Vertical slices
pub mod playback_state;
pub mod settings;

pub use error::{Result, StorageError};
pub use store::SqlitePlaybackStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    debug!("Migrations applied");
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://cadence.db>`)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    info!("Opening database {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    Ok(pool)
}

/// Open a database file and bring its schema up to date
pub async fn open(database_url: &str) -> Result<SqlitePlaybackStore> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(SqlitePlaybackStore::new(pool))
}
