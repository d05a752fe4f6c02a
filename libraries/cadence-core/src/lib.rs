//! Cadence Core
//!
//! Library catalog, sort engine and the types shared by the playback and
//! storage crates.
//!
//! # Architecture
//!
//! - **Catalog**: read-only arena of songs, albums, artists and genres built
//!   from media index rows
//! - **Sort engine**: stable, article-insensitive orderings
//! - **Durable identity**: content hashes that survive rescans
//! - **Snapshot records**: the flat form of the playback state
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Catalog, DuplicatePolicy, MediaRecord};
//!
//! let catalog = Catalog::build(
//!     vec![MediaRecord {
//!         id: 1,
//!         title: "Song".into(),
//!         track: 1,
//!         duration_ms: 180_000,
//!         album: "Album".into(),
//!         artist: "Artist".into(),
//!         year: 2001,
//!         genre: Some("(17)".into()),
//!     }],
//!     DuplicatePolicy::Collapse,
//! );
//!
//! assert_eq!(catalog.genres()[0].resolved_name, "Rock");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod settings;
pub mod sort;
pub mod storage;
pub mod types;

pub use catalog::{Catalog, DuplicatePolicy, MediaRecord};
pub use error::{CadenceError, Result};
pub use settings::PlaybackSettings;
pub use sort::{SortKey, Sortable};
pub use storage::PlaybackStore;

pub use types::{
    content_hash, resolve_genre_name, Album, AlbumId, Artist, ArtistId, EntityHash, Genre,
    GenreId, LoopMode, PlaybackMode, PlaybackSnapshot, QueueItemRecord, Scope, Song, SongId,
    StateRecord, SNAPSHOT_VERSION, UNSET_HASH,
};
