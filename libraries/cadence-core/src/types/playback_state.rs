/// Playback state types shared by the queue engine and storage
use super::{AlbumId, ArtistId, EntityHash, GenreId, UNSET_HASH};
use serde::{Deserialize, Serialize};

/// Current snapshot layout version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Which collection the active queue was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackMode {
    #[default]
    AllSongs,
    InGenre,
    InArtist,
    InAlbum,
}

impl PlaybackMode {
    /// Integer code used in persisted records
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::AllSongs => 0,
            Self::InGenre => 1,
            Self::InArtist => 2,
            Self::InAlbum => 3,
        }
    }

    /// Parse a persisted code; unknown codes fall back to `AllSongs`
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::InGenre,
            2 => Self::InArtist,
            3 => Self::InAlbum,
            _ => Self::AllSongs,
        }
    }
}

/// Loop mode for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Stop (paused) after the last song
    #[default]
    None,
    /// Loop the entire queue
    All,
    /// Repeat the current song
    Track,
}

impl LoopMode {
    /// Integer code used in persisted records
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::All => 1,
            Self::Track => 2,
        }
    }

    /// Parse a persisted code; unknown codes fall back to `None`
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::All,
            2 => Self::Track,
            _ => Self::None,
        }
    }

    /// Next mode in the None -> All -> Track cycle
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::Track,
            Self::Track => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::All => "all",
            Self::Track => "track",
        }
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The library entity a queue was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scope {
    /// The whole catalog
    #[default]
    AllSongs,
    Album(AlbumId),
    Artist(ArtistId),
    Genre(GenreId),
}

impl Scope {
    /// Playback mode mirroring this scope
    #[must_use]
    pub fn mode(self) -> PlaybackMode {
        match self {
            Self::AllSongs => PlaybackMode::AllSongs,
            Self::Album(_) => PlaybackMode::InAlbum,
            Self::Artist(_) => PlaybackMode::InArtist,
            Self::Genre(_) => PlaybackMode::InGenre,
        }
    }
}

/// The single persisted playback-state row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Hash of the current song, or [`UNSET_HASH`]
    pub song_hash: EntityHash,
    pub position_ms: i64,
    /// Hash of the parent album/artist/genre, or [`UNSET_HASH`]
    pub parent_hash: EntityHash,
    pub index: i32,
    pub mode: i32,
    pub is_shuffling: bool,
    pub loop_mode: i32,
    pub in_priority_queue: bool,
}

impl Default for StateRecord {
    fn default() -> Self {
        Self {
            song_hash: UNSET_HASH,
            position_ms: 0,
            parent_hash: UNSET_HASH,
            index: 0,
            mode: PlaybackMode::AllSongs.code(),
            is_shuffling: false,
            loop_mode: LoopMode::None.code(),
            in_priority_queue: false,
        }
    }
}

/// One persisted queue entry
///
/// Priority items are stored first; `sequence_id` gives the overall order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItemRecord {
    pub sequence_id: i64,
    pub song_hash: EntityHash,
    pub album_hash: EntityHash,
    pub is_priority_queue_item: bool,
}

/// Flat, versioned representation of the whole playback state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub version: u32,
    pub state: StateRecord,
    pub items: Vec<QueueItemRecord>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state: StateRecord::default(),
            items: Vec::new(),
        }
    }
}
