//! Persistence seam for playback state and preferences

use crate::error::Result;
use crate::settings::PlaybackSettings;
use crate::types::PlaybackSnapshot;
use async_trait::async_trait;

/// Durable home of the playback snapshot and the playback preferences
///
/// Implementations replace the snapshot wholesale on every save. The queue
/// engine never talks to a store directly; callers snapshot the engine and
/// hand the result over, usually from a background task.
#[async_trait]
pub trait PlaybackStore: Send + Sync {
    /// Replace the stored snapshot
    async fn save_snapshot(&self, snapshot: &PlaybackSnapshot) -> Result<()>;

    /// Load the stored snapshot, `None` when nothing was saved yet
    async fn load_snapshot(&self) -> Result<Option<PlaybackSnapshot>>;

    /// Drop the stored snapshot
    async fn clear_snapshot(&self) -> Result<()>;

    /// Load preferences, defaulting anything not stored
    async fn load_settings(&self) -> Result<PlaybackSettings>;

    /// Store one preference value
    async fn save_setting(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Store every preference
    async fn save_settings(&self, settings: &PlaybackSettings) -> Result<()> {
        for (key, value) in settings.entries() {
            self.save_setting(key, &value).await?;
        }
        Ok(())
    }
}
