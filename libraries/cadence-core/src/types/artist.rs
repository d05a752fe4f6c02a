//! Artist types

use super::{content_hash, AlbumId, ArtistId, EntityHash};
use serde::{Deserialize, Serialize};

/// An artist
///
/// Songs and the dominant genre are derived through the catalog; see
/// [`crate::Catalog::artist_songs`] and [`crate::Catalog::artist_genre`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub(crate) album_ids: Vec<AlbumId>,
    hash: EntityHash,
}

impl Artist {
    pub(crate) fn new(id: ArtistId, name: String) -> Self {
        let hash = content_hash(&[&name]);
        Self {
            id,
            name,
            album_ids: Vec::new(),
            hash,
        }
    }

    pub fn hash(&self) -> EntityHash {
        self.hash
    }

    pub fn album_ids(&self) -> &[AlbumId] {
        &self.album_ids
    }
}
