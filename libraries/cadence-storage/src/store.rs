use crate::{playback_state, settings};
use async_trait::async_trait;
use cadence_core::{PlaybackSettings, PlaybackSnapshot, PlaybackStore, Result};
use sqlx::SqlitePool;

/// `PlaybackStore` backed by `SQLite`
#[derive(Debug, Clone)]
pub struct SqlitePlaybackStore {
    pool: SqlitePool,
}

impl SqlitePlaybackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PlaybackStore for SqlitePlaybackStore {
    async fn save_snapshot(&self, snapshot: &PlaybackSnapshot) -> Result<()> {
        Ok(playback_state::save(&self.pool, snapshot).await?)
    }

    async fn load_snapshot(&self) -> Result<Option<PlaybackSnapshot>> {
        Ok(playback_state::load(&self.pool).await?)
    }

    async fn clear_snapshot(&self) -> Result<()> {
        Ok(playback_state::clear(&self.pool).await?)
    }

    async fn load_settings(&self) -> Result<PlaybackSettings> {
        let stored = settings::get_all_settings(&self.pool).await?;
        Ok(PlaybackSettings::from_entries(
            stored.iter().map(|s| (s.key.as_str(), &s.value)),
        ))
    }

    async fn save_setting(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        // Reject values the engine could not read back
        PlaybackSettings::default().apply(key, value)?;
        Ok(settings::set_setting(&self.pool, key, value).await?)
    }
}
