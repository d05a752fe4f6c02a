mod album;
mod artist;
mod genre;
mod ids;
mod playback_state;
mod song;

pub use album::Album;
pub use artist::Artist;
pub use genre::{resolve_genre_name, Genre};
pub use ids::{content_hash, AlbumId, ArtistId, EntityHash, GenreId, SongId, UNSET_HASH};
pub use playback_state::{
    LoopMode, PlaybackMode, PlaybackSnapshot, QueueItemRecord, Scope, StateRecord,
    SNAPSHOT_VERSION,
};
pub use song::Song;
