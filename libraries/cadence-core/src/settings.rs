//! Playback preferences
//!
//! Preferences are persisted as individual key/JSON-value pairs so a store
//! can hold keys written by newer or older versions side by side.

use crate::error::{CadenceError, Result};
use crate::sort::SortKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reshuffle with the chosen song pinned when starting a song while shuffling
pub const SETTING_KEEP_SHUFFLE: &str = "playback.keep_shuffle_across_songs";

/// "Previous" restarts the song once it has played for a few seconds
pub const SETTING_REWIND_ON_PREVIOUS: &str = "playback.rewind_on_previous";

pub const SETTING_SONG_SORT: &str = "sort.songs";
pub const SETTING_ALBUM_SORT: &str = "sort.album";
pub const SETTING_ARTIST_SORT: &str = "sort.artist";
pub const SETTING_GENRE_SORT: &str = "sort.genre";
pub const SETTING_SEARCH_SORT: &str = "sort.search";

/// Behaviour toggles and per-scope sort keys read by the queue engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub keep_shuffle_across_songs: bool,
    pub rewind_on_previous: bool,
    /// Order of the all-songs queue
    pub song_sort: SortKey,
    /// Order of songs inside an album
    pub album_sort: SortKey,
    /// Order of an artist's songs; numeric keys order albums by year
    pub artist_sort: SortKey,
    /// Order of songs inside a genre
    pub genre_sort: SortKey,
    /// Order of search results
    pub search_sort: SortKey,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            keep_shuffle_across_songs: true,
            rewind_on_previous: true,
            song_sort: SortKey::AlphabeticAscending,
            album_sort: SortKey::NumericAscending,
            artist_sort: SortKey::NumericAscending,
            genre_sort: SortKey::AlphabeticAscending,
            search_sort: SortKey::AlphabeticAscending,
        }
    }
}

impl PlaybackSettings {
    /// Every known key with its current value
    pub fn entries(&self) -> Vec<(&'static str, serde_json::Value)> {
        vec![
            (SETTING_KEEP_SHUFFLE, self.keep_shuffle_across_songs.into()),
            (SETTING_REWIND_ON_PREVIOUS, self.rewind_on_previous.into()),
            (SETTING_SONG_SORT, sort_value(self.song_sort)),
            (SETTING_ALBUM_SORT, sort_value(self.album_sort)),
            (SETTING_ARTIST_SORT, sort_value(self.artist_sort)),
            (SETTING_GENRE_SORT, sort_value(self.genre_sort)),
            (SETTING_SEARCH_SORT, sort_value(self.search_sort)),
        ]
    }

    /// Set one preference from its persisted form
    pub fn apply(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        match key {
            SETTING_KEEP_SHUFFLE => self.keep_shuffle_across_songs = parse_bool(key, value)?,
            SETTING_REWIND_ON_PREVIOUS => self.rewind_on_previous = parse_bool(key, value)?,
            SETTING_SONG_SORT => self.song_sort = parse_sort(value)?,
            SETTING_ALBUM_SORT => self.album_sort = parse_sort(value)?,
            SETTING_ARTIST_SORT => self.artist_sort = parse_sort(value)?,
            SETTING_GENRE_SORT => self.genre_sort = parse_sort(value)?,
            SETTING_SEARCH_SORT => self.search_sort = parse_sort(value)?,
            _ => return Err(CadenceError::invalid_input(format!("unknown setting '{key}'"))),
        }
        Ok(())
    }

    /// Build settings from stored pairs
    ///
    /// Unknown keys and malformed values are skipped and keep their defaults.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a serde_json::Value)>,
    ) -> Self {
        let mut settings = Self::default();
        for (key, value) in entries {
            if let Err(e) = settings.apply(key, value) {
                debug!("Ignoring stored setting {}: {}", key, e);
            }
        }
        settings
    }
}

fn sort_value(key: SortKey) -> serde_json::Value {
    serde_json::to_value(key).unwrap_or(serde_json::Value::Null)
}

fn parse_bool(key: &str, value: &serde_json::Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| CadenceError::invalid_input(format!("'{key}' expects a boolean")))
}

fn parse_sort(value: &serde_json::Value) -> Result<SortKey> {
    Ok(serde_json::from_value(value.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let settings = PlaybackSettings::default();
        assert!(settings.keep_shuffle_across_songs);
        assert!(settings.rewind_on_previous);
        assert_eq!(settings.album_sort, SortKey::NumericAscending);
        assert_eq!(settings.song_sort, SortKey::AlphabeticAscending);
    }

    #[test]
    fn applies_known_keys() {
        let mut settings = PlaybackSettings::default();
        settings.apply(SETTING_REWIND_ON_PREVIOUS, &json!(false)).unwrap();
        settings
            .apply(SETTING_ARTIST_SORT, &json!("numeric_descending"))
            .unwrap();

        assert!(!settings.rewind_on_previous);
        assert_eq!(settings.artist_sort, SortKey::NumericDescending);
    }

    #[test]
    fn rejects_bad_input() {
        let mut settings = PlaybackSettings::default();
        assert!(settings.apply("nope", &json!(true)).is_err());
        assert!(settings.apply(SETTING_KEEP_SHUFFLE, &json!("yes")).is_err());
        assert!(settings.apply(SETTING_GENRE_SORT, &json!("sideways")).is_err());
        assert_eq!(settings, PlaybackSettings::default());
    }

    #[test]
    fn entries_rebuild_the_same_settings() {
        let mut original = PlaybackSettings::default();
        original.keep_shuffle_across_songs = false;
        original.search_sort = SortKey::None;

        let entries = original.entries();
        let rebuilt = PlaybackSettings::from_entries(entries.iter().map(|(k, v)| (*k, v)));
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn from_entries_skips_garbage() {
        let stored = [
            ("ui.theme".to_string(), json!("dark")),
            (SETTING_SONG_SORT.to_string(), json!(42)),
            (SETTING_REWIND_ON_PREVIOUS.to_string(), json!(false)),
        ];
        let settings = PlaybackSettings::from_entries(stored.iter().map(|(k, v)| (k.as_str(), v)));
        assert!(!settings.rewind_on_previous);
        assert_eq!(settings.song_sort, SortKey::AlphabeticAscending);
    }
}
