//! Sort engine
//!
//! Pure, stable orderings of catalog entities. Every function returns a new
//! list; ties keep their input order.

use crate::catalog::Catalog;
use crate::settings::PlaybackSettings;
use crate::types::{Album, Artist, Genre, PlaybackMode, Scope, Song, SongId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Ordering applied to a list of entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Keep input order
    #[default]
    None,
    AlphabeticAscending,
    AlphabeticDescending,
    NumericAscending,
    NumericDescending,
}

impl SortKey {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::NumericAscending | Self::NumericDescending)
    }

    pub fn is_alphabetic(self) -> bool {
        matches!(self, Self::AlphabeticAscending | Self::AlphabeticDescending)
    }

    pub fn is_descending(self) -> bool {
        matches!(self, Self::AlphabeticDescending | Self::NumericDescending)
    }
}

/// An entity the sort engine can order
pub trait Sortable {
    /// Whether numeric keys apply (songs by track, albums by year)
    const HAS_NUMERIC_ORDER: bool;

    fn sort_name(&self) -> &str;

    fn sort_number(&self) -> u32 {
        0
    }
}

impl Sortable for Song {
    const HAS_NUMERIC_ORDER: bool = true;

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_number(&self) -> u32 {
        self.track
    }
}

impl Sortable for Album {
    const HAS_NUMERIC_ORDER: bool = true;

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn sort_number(&self) -> u32 {
        self.year
    }
}

impl Sortable for Artist {
    const HAS_NUMERIC_ORDER: bool = false;

    fn sort_name(&self) -> &str {
        &self.name
    }
}

impl Sortable for Genre {
    const HAS_NUMERIC_ORDER: bool = false;

    fn sort_name(&self) -> &str {
        &self.resolved_name
    }
}

const ARTICLES: [&str; 3] = ["the ", "an ", "a "];

/// Comparison key for alphabetic sorting
///
/// Lowercases and strips one leading English article, so "The Beatles"
/// sorts under "b".
pub fn sort_key_for(name: &str) -> String {
    let lower = name.trim_start().to_lowercase();
    ARTICLES
        .iter()
        .find_map(|article| lower.strip_prefix(article))
        .map_or_else(|| lower.clone(), str::to_string)
}

/// Order `items` by `key`
///
/// Numeric keys on entities without a numeric order return the input
/// unchanged.
pub fn sorted<'a, T: Sortable>(items: &[&'a T], key: SortKey) -> Vec<&'a T> {
    let mut out = items.to_vec();
    match key {
        SortKey::None => {}
        SortKey::AlphabeticAscending => {
            out.sort_by_cached_key(|item| sort_key_for(item.sort_name()));
        }
        SortKey::AlphabeticDescending => {
            out.sort_by_cached_key(|item| Reverse(sort_key_for(item.sort_name())));
        }
        SortKey::NumericAscending if T::HAS_NUMERIC_ORDER => {
            out.sort_by_key(|item| item.sort_number());
        }
        SortKey::NumericDescending if T::HAS_NUMERIC_ORDER => {
            out.sort_by_key(|item| Reverse(item.sort_number()));
        }
        SortKey::NumericAscending | SortKey::NumericDescending => {}
    }
    out
}

/// An artist's songs grouped by album
///
/// Albums are ordered by year in the requested direction; songs inside an
/// album always run by ascending track number.
pub fn artist_songs_by_year<'a>(
    catalog: &'a Catalog,
    artist: &Artist,
    descending: bool,
) -> Vec<&'a Song> {
    let albums: Vec<&Album> = artist
        .album_ids()
        .iter()
        .filter_map(|&id| catalog.album(id))
        .collect();
    let key = if descending {
        SortKey::NumericDescending
    } else {
        SortKey::NumericAscending
    };

    sorted(&albums, key)
        .into_iter()
        .flat_map(|album| sorted(&catalog.album_songs(album), SortKey::NumericAscending))
        .collect()
}

/// An artist's songs ordered by `key`
pub fn artist_songs<'a>(catalog: &'a Catalog, artist: &Artist, key: SortKey) -> Vec<&'a Song> {
    match key {
        SortKey::NumericAscending => artist_songs_by_year(catalog, artist, false),
        SortKey::NumericDescending => artist_songs_by_year(catalog, artist, true),
        _ => sorted(&catalog.artist_songs(artist), key),
    }
}

/// Sort key used for queues built in `mode`
pub fn key_for_mode(mode: PlaybackMode, settings: &PlaybackSettings) -> SortKey {
    match mode {
        PlaybackMode::AllSongs => settings.song_sort,
        PlaybackMode::InGenre => settings.genre_sort,
        PlaybackMode::InArtist => settings.artist_sort,
        PlaybackMode::InAlbum => settings.album_sort,
    }
}

/// Ordered song ids of a scope, as used for unshuffled queues
///
/// A scope whose entity is no longer in the catalog yields an empty list.
pub fn scope_songs(catalog: &Catalog, scope: Scope, settings: &PlaybackSettings) -> Vec<SongId> {
    let key = key_for_mode(scope.mode(), settings);
    let songs = match scope {
        Scope::AllSongs => {
            let all: Vec<&Song> = catalog.songs().iter().collect();
            sorted(&all, key)
        }
        Scope::Album(id) => catalog
            .album(id)
            .map(|album| sorted(&catalog.album_songs(album), key))
            .unwrap_or_default(),
        Scope::Artist(id) => catalog
            .artist(id)
            .map(|artist| artist_songs(catalog, artist, key))
            .unwrap_or_default(),
        Scope::Genre(id) => catalog
            .genre(id)
            .map(|genre| sorted(&catalog.genre_songs(genre), key))
            .unwrap_or_default(),
    };
    songs.into_iter().map(|song| song.id).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::catalog::{DuplicatePolicy, MediaRecord};
    use proptest::prelude::*;

    fn catalog_strategy() -> impl Strategy<Value = Catalog> {
        prop::collection::vec(("(the |an |a )?[A-Za-z]{1,6}", 1u32..20, 1970u32..2020), 1..30)
            .prop_map(|rows| {
                let records = rows.into_iter().enumerate().map(|(i, (title, track, year))| {
                    MediaRecord {
                        id: i as i64,
                        title,
                        track,
                        duration_ms: 1000,
                        album: format!("LP{}", year % 4),
                        artist: "Band".to_string(),
                        year,
                        genre: None,
                    }
                });
                Catalog::build(records, DuplicatePolicy::KeepAll)
            })
    }

    fn key_strategy() -> impl Strategy<Value = SortKey> {
        prop_oneof![
            Just(SortKey::None),
            Just(SortKey::AlphabeticAscending),
            Just(SortKey::AlphabeticDescending),
            Just(SortKey::NumericAscending),
            Just(SortKey::NumericDescending),
        ]
    }

    proptest! {
        #[test]
        fn sorting_is_a_permutation(catalog in catalog_strategy(), key in key_strategy()) {
            let songs: Vec<&Song> = catalog.songs().iter().collect();
            let mut before: Vec<SongId> = songs.iter().map(|s| s.id).collect();
            let mut after: Vec<SongId> = sorted(&songs, key).iter().map(|s| s.id).collect();
            before.sort_unstable();
            after.sort_unstable();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn alphabetic_keys_are_ordered(catalog in catalog_strategy()) {
            let songs: Vec<&Song> = catalog.songs().iter().collect();
            let keys: Vec<String> = sorted(&songs, SortKey::AlphabeticAscending)
                .iter()
                .map(|s| sort_key_for(&s.name))
                .collect();
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn sorting_twice_changes_nothing(catalog in catalog_strategy(), key in key_strategy()) {
            let songs: Vec<&Song> = catalog.songs().iter().collect();
            let once = sorted(&songs, key);
            let twice = sorted(&once, key);
            let ids = |list: &[&Song]| list.iter().map(|s| s.id).collect::<Vec<_>>();
            prop_assert_eq!(ids(&once), ids(&twice));
        }
    }
}
