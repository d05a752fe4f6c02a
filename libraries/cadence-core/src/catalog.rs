//! Read-only library catalog
//!
//! Built once from the rows of the platform media index. The catalog owns
//! every entity; songs, albums, artists and genres refer to each other by id.

use crate::error::{CadenceError, Result};
use crate::types::{
    Album, AlbumId, Artist, ArtistId, EntityHash, Genre, GenreId, PlaybackMode, Scope, Song,
    SongId,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// Display name used when a row has no artist tag
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Display name used when a row has no album tag
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One row of the platform media index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: SongId,
    pub title: String,
    #[serde(default)]
    pub track: u32,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub genre: Option<String>,
}

/// What to do with rows that describe the same song twice
///
/// Two rows are duplicates when they land on the same album with the same
/// title and track number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first row, drop the rest
    #[default]
    Collapse,
    /// Keep every row as its own song
    KeepAll,
}

/// Immutable library catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
    albums: Vec<Album>,
    artists: Vec<Artist>,
    genres: Vec<Genre>,
    song_index: HashMap<SongId, usize>,
    album_index: HashMap<AlbumId, usize>,
    artist_index: HashMap<ArtistId, usize>,
    genre_index: HashMap<GenreId, usize>,
    /// Every song per (song hash, album hash), in catalog order
    song_by_hash: HashMap<(EntityHash, EntityHash), Vec<SongId>>,
    album_by_hash: HashMap<EntityHash, AlbumId>,
    artist_by_hash: HashMap<EntityHash, ArtistId>,
    genre_by_hash: HashMap<EntityHash, GenreId>,
}

fn non_empty(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn index_by<T>(items: &[T], id: impl Fn(&T) -> i64) -> HashMap<i64, usize> {
    items.iter().enumerate().map(|(i, item)| (id(item), i)).collect()
}

impl Catalog {
    /// Build a catalog from media index rows
    ///
    /// Rows without a title or with an already-seen id are dropped. Album,
    /// artist and genre ids are assigned in first-seen order.
    pub fn build(records: impl IntoIterator<Item = MediaRecord>, policy: DuplicatePolicy) -> Self {
        let mut songs: Vec<Song> = Vec::new();
        let mut albums: Vec<Album> = Vec::new();
        let mut artists: Vec<Artist> = Vec::new();
        let mut genres: Vec<Genre> = Vec::new();

        let mut artist_by_name: HashMap<String, usize> = HashMap::new();
        let mut album_by_key: HashMap<(String, String), usize> = HashMap::new();
        let mut genre_by_name: HashMap<String, usize> = HashMap::new();
        let mut seen_ids: HashSet<SongId> = HashSet::new();
        let mut seen_songs: HashSet<(AlbumId, String, u32)> = HashSet::new();
        let mut dropped = 0usize;

        for record in records {
            let title = record.title.trim().to_string();
            if title.is_empty() || seen_ids.contains(&record.id) {
                debug!("Dropping media row {} ({:?})", record.id, record.title);
                dropped += 1;
                continue;
            }

            let artist_name = non_empty(&record.artist, UNKNOWN_ARTIST);
            let album_name = non_empty(&record.album, UNKNOWN_ALBUM);

            let artist_idx = *artist_by_name.entry(artist_name.clone()).or_insert_with(|| {
                artists.push(Artist::new(artists.len() as ArtistId + 1, artist_name.clone()));
                artists.len() - 1
            });

            let album_idx = *album_by_key
                .entry((album_name.clone(), artist_name.clone()))
                .or_insert_with(|| {
                    let artist = &mut artists[artist_idx];
                    let id = albums.len() as AlbumId + 1;
                    artist.album_ids.push(id);
                    albums.push(Album::new(id, album_name, artist_name, record.year, artist.id));
                    albums.len() - 1
                });

            let album = &mut albums[album_idx];
            if album.year == 0 {
                album.year = record.year;
            }

            if policy == DuplicatePolicy::Collapse
                && !seen_songs.insert((album.id, title.clone(), record.track))
            {
                debug!(
                    "Collapsing duplicate '{}' (track {}) on album '{}'",
                    title, record.track, album.name
                );
                dropped += 1;
                continue;
            }

            let genre_id = record
                .genre
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    let idx = *genre_by_name.entry(name.to_string()).or_insert_with(|| {
                        genres.push(Genre::new(genres.len() as GenreId + 1, name.to_string()));
                        genres.len() - 1
                    });
                    genres[idx].song_ids.push(record.id);
                    genres[idx].id
                });

            seen_ids.insert(record.id);
            album.song_ids.push(record.id);
            songs.push(Song::new(
                record.id,
                title,
                record.track,
                record.duration_ms,
                album.id,
                genre_id,
            ));
        }

        // Prune anything left without members
        albums.retain(|album| !album.song_ids.is_empty());
        genres.retain(|genre| !genre.song_ids.is_empty());
        let live_albums: HashSet<AlbumId> = albums.iter().map(|album| album.id).collect();
        for artist in &mut artists {
            artist.album_ids.retain(|id| live_albums.contains(id));
        }
        artists.retain(|artist| !artist.album_ids.is_empty());

        let song_index = index_by(&songs, |song| song.id);
        for album in &mut albums {
            album
                .song_ids
                .sort_by_key(|id| song_index.get(id).map_or(0, |&i| songs[i].track));
            album.compute_hash();
        }

        let album_index = index_by(&albums, |album| album.id);
        let artist_index = index_by(&artists, |artist| artist.id);
        let genre_index = index_by(&genres, |genre| genre.id);

        let mut song_by_hash: HashMap<_, Vec<SongId>> = HashMap::new();
        for song in &songs {
            if let Some(&i) = album_index.get(&song.album_id()) {
                song_by_hash
                    .entry((song.hash(), albums[i].hash()))
                    .or_default()
                    .push(song.id);
            }
        }

        let mut album_by_hash = HashMap::new();
        for album in &albums {
            album_by_hash.entry(album.hash()).or_insert(album.id);
        }
        let mut artist_by_hash = HashMap::new();
        for artist in &artists {
            artist_by_hash.entry(artist.hash()).or_insert(artist.id);
        }
        let mut genre_by_hash = HashMap::new();
        for genre in &genres {
            genre_by_hash.entry(genre.hash()).or_insert(genre.id);
        }

        info!(
            "Catalog built: {} songs, {} albums, {} artists, {} genres ({} rows dropped)",
            songs.len(),
            albums.len(),
            artists.len(),
            genres.len(),
            dropped
        );

        Self {
            songs,
            albums,
            artists,
            genres,
            song_index,
            album_index,
            artist_index,
            genre_index,
            song_by_hash,
            album_by_hash,
            artist_by_hash,
            genre_by_hash,
        }
    }

    /// Build a catalog from a JSON array of [`MediaRecord`]s
    pub fn from_json(json: &str, policy: DuplicatePolicy) -> Result<Self> {
        let records: Vec<MediaRecord> = serde_json::from_str(json)?;
        Ok(Self::build(records, policy))
    }

    /// Read a JSON catalog export from disk
    pub fn load(path: &Path, policy: DuplicatePolicy) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CadenceError::catalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json, policy)
    }

    // ===== Collections =====

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    // ===== Lookups by id =====

    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.song_index.get(&id).map(|&i| &self.songs[i])
    }

    pub fn album(&self, id: AlbumId) -> Option<&Album> {
        self.album_index.get(&id).map(|&i| &self.albums[i])
    }

    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artist_index.get(&id).map(|&i| &self.artists[i])
    }

    pub fn genre(&self, id: GenreId) -> Option<&Genre> {
        self.genre_index.get(&id).map(|&i| &self.genres[i])
    }

    // ===== Relationships =====

    pub fn album_of(&self, song: &Song) -> Option<&Album> {
        self.album(song.album_id())
    }

    pub fn genre_of(&self, song: &Song) -> Option<&Genre> {
        song.genre_id().and_then(|id| self.genre(id))
    }

    pub fn artist_of(&self, album: &Album) -> Option<&Artist> {
        self.artist(album.artist_id())
    }

    /// Songs of an album in track order
    pub fn album_songs(&self, album: &Album) -> Vec<&Song> {
        album.song_ids().iter().filter_map(|&id| self.song(id)).collect()
    }

    /// Songs of a genre in catalog order
    pub fn genre_songs(&self, genre: &Genre) -> Vec<&Song> {
        genre.song_ids().iter().filter_map(|&id| self.song(id)).collect()
    }

    /// All songs of an artist, album by album
    pub fn artist_songs(&self, artist: &Artist) -> Vec<&Song> {
        artist
            .album_ids()
            .iter()
            .filter_map(|&id| self.album(id))
            .flat_map(|album| self.album_songs(album))
            .collect()
    }

    /// Genre holding the most of an artist's songs
    ///
    /// Ties go to the genre that comes first in the catalog.
    pub fn artist_genre(&self, artist: &Artist) -> Option<&Genre> {
        let mut counts: HashMap<GenreId, usize> = HashMap::new();
        for song in self.artist_songs(artist) {
            if let Some(genre_id) = song.genre_id() {
                *counts.entry(genre_id).or_default() += 1;
            }
        }

        let mut best: Option<(&Genre, usize)> = None;
        for genre in &self.genres {
            let count = counts.get(&genre.id).copied().unwrap_or(0);
            if count > 0 && best.map(|(_, top)| count > top).unwrap_or(true) {
                best = Some((genre, count));
            }
        }
        best.map(|(genre, _)| genre)
    }

    // ===== Durable identity =====

    /// Find a song by its hash and its album's hash
    ///
    /// The album hash separates songs whose own hashes collide.
    pub fn find_song_by_hash(&self, song_hash: EntityHash, album_hash: EntityHash) -> Option<&Song> {
        self.songs_by_hash(song_hash, album_hash)
            .first()
            .and_then(|&id| self.song(id))
    }

    /// Every song sharing a hash pair, in catalog order
    ///
    /// More than one only for duplicates kept by [`DuplicatePolicy::KeepAll`].
    pub fn songs_by_hash(&self, song_hash: EntityHash, album_hash: EntityHash) -> &[SongId] {
        self.song_by_hash
            .get(&(song_hash, album_hash))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find the first song with the given hash, on any album
    pub fn find_song_by_song_hash(&self, song_hash: EntityHash) -> Option<&Song> {
        self.songs.iter().find(|song| song.hash() == song_hash)
    }

    pub fn find_album_by_hash(&self, hash: EntityHash) -> Option<&Album> {
        self.album_by_hash.get(&hash).and_then(|&id| self.album(id))
    }

    pub fn find_artist_by_hash(&self, hash: EntityHash) -> Option<&Artist> {
        self.artist_by_hash.get(&hash).and_then(|&id| self.artist(id))
    }

    pub fn find_genre_by_hash(&self, hash: EntityHash) -> Option<&Genre> {
        self.genre_by_hash.get(&hash).and_then(|&id| self.genre(id))
    }

    /// Durable hash of a scope's entity (`None` for all songs or a stale id)
    pub fn scope_hash(&self, scope: Scope) -> Option<EntityHash> {
        match scope {
            Scope::AllSongs => None,
            Scope::Album(id) => self.album(id).map(Album::hash),
            Scope::Artist(id) => self.artist(id).map(Artist::hash),
            Scope::Genre(id) => self.genre(id).map(Genre::hash),
        }
    }

    /// Resolve a persisted parent hash within the collection implied by `mode`
    pub fn find_scope_by_hash(&self, mode: PlaybackMode, hash: EntityHash) -> Option<Scope> {
        match mode {
            PlaybackMode::AllSongs => None,
            PlaybackMode::InAlbum => self.find_album_by_hash(hash).map(|a| Scope::Album(a.id)),
            PlaybackMode::InArtist => self.find_artist_by_hash(hash).map(|a| Scope::Artist(a.id)),
            PlaybackMode::InGenre => self.find_genre_by_hash(hash).map(|g| Scope::Genre(g.id)),
        }
    }

    /// Scope of `mode` that contains `song`
    ///
    /// Falls back to [`Scope::AllSongs`] when the song has no such parent.
    pub fn scope_of(&self, song: &Song, mode: PlaybackMode) -> Scope {
        let scope = match mode {
            PlaybackMode::AllSongs => None,
            PlaybackMode::InAlbum => Some(Scope::Album(song.album_id())),
            PlaybackMode::InArtist => self
                .album_of(song)
                .map(|album| Scope::Artist(album.artist_id())),
            PlaybackMode::InGenre => song.genre_id().map(Scope::Genre),
        };
        scope.unwrap_or(Scope::AllSongs)
    }
}
