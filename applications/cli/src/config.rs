/// CLI configuration
use crate::error::{CliError, Result};
use cadence_core::{DuplicatePolicy, PlaybackSettings, SortKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    /// Overrides applied on top of the stored preferences
    #[serde(default)]
    pub playback: PlaybackOverrides,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// JSON export of the media index
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaybackOverrides {
    pub keep_shuffle_across_songs: Option<bool>,
    pub rewind_on_previous: Option<bool>,
    pub song_sort: Option<SortKey>,
    pub album_sort: Option<SortKey>,
    pub artist_sort: Option<SortKey>,
    pub genre_sort: Option<SortKey>,
    pub search_sort: Option<SortKey>,
}

impl PlaybackOverrides {
    /// Apply every override that is set
    pub fn apply(&self, settings: &mut PlaybackSettings) {
        if let Some(keep) = self.keep_shuffle_across_songs {
            settings.keep_shuffle_across_songs = keep;
        }
        if let Some(rewind) = self.rewind_on_previous {
            settings.rewind_on_previous = rewind;
        }
        if let Some(key) = self.song_sort {
            settings.song_sort = key;
        }
        if let Some(key) = self.album_sort {
            settings.album_sort = key;
        }
        if let Some(key) = self.artist_sort {
            settings.artist_sort = key;
        }
        if let Some(key) = self.genre_sort {
            settings.genre_sort = key;
        }
        if let Some(key) = self.search_sort {
            settings.search_sort = key;
        }
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to [`DEFAULT_CONFIG_FILE`]; a missing default file is
    /// fine, a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) if !path.exists() => {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. CADENCE_STORAGE__DATABASE_URL
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }
}

// Default values
impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://./cadence.db".to_string()
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./library.json")
}
