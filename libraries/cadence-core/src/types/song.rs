//! Song types

use super::{content_hash, AlbumId, EntityHash, GenreId, SongId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A song in the library
///
/// Album and genre links are set once by the catalog builder and are
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub name: String,
    pub track: u32,
    pub duration_ms: u64,
    hash: EntityHash,
    album_id: AlbumId,
    genre_id: Option<GenreId>,
}

impl Song {
    pub(crate) fn new(
        id: SongId,
        name: String,
        track: u32,
        duration_ms: u64,
        album_id: AlbumId,
        genre_id: Option<GenreId>,
    ) -> Self {
        let hash = content_hash(&[&name, &track.to_string(), &duration_ms.to_string()]);
        Self {
            id,
            name,
            track,
            duration_ms,
            hash,
            album_id,
            genre_id,
        }
    }

    /// Durable hash of name, track number and duration
    pub fn hash(&self) -> EntityHash {
        self.hash
    }

    /// Album this song belongs to
    pub fn album_id(&self) -> AlbumId {
        self.album_id
    }

    /// Genre this song is linked to, if any
    pub fn genre_id(&self) -> Option<GenreId> {
        self.genre_id
    }

    /// Song length
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
