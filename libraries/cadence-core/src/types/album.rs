//! Album types

use super::{content_hash, AlbumId, ArtistId, EntityHash, SongId};
use serde::{Deserialize, Serialize};

/// An album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub artist_name: String,
    /// Release year, 0 when unknown
    pub year: u32,
    pub(crate) song_ids: Vec<SongId>,
    pub(crate) hash: EntityHash,
    pub(crate) artist_id: ArtistId,
}

impl Album {
    pub(crate) fn new(
        id: AlbumId,
        name: String,
        artist_name: String,
        year: u32,
        artist_id: ArtistId,
    ) -> Self {
        Self {
            id,
            name,
            artist_name,
            year,
            song_ids: Vec::new(),
            hash: 0,
            artist_id,
        }
    }

    pub(crate) fn compute_hash(&mut self) {
        self.hash = content_hash(&[&self.name, &self.artist_name, &self.year.to_string()]);
    }

    /// Durable hash of name, artist name and year
    pub fn hash(&self) -> EntityHash {
        self.hash
    }

    /// Songs on this album, in track order
    pub fn song_ids(&self) -> &[SongId] {
        &self.song_ids
    }

    /// Artist this album belongs to
    pub fn artist_id(&self) -> ArtistId {
        self.artist_id
    }
}
