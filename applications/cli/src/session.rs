//! One engine bound to one catalog and one store

use crate::commands::{Action, ListKind, QueueOp, ScopeKind, SettingsOp, Switch};
use crate::config::{CliConfig, PlaybackOverrides};
use crate::error::{CliError, Result};
use crate::sink::LoggingSink;
use cadence_core::sort::{sorted, Sortable};
use cadence_core::{Catalog, LoopMode, PlaybackSettings, PlaybackStore, Scope, SongId};
use cadence_playback::{PlaybackSink, QueueEngine, QueueKind};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct Session {
    engine: QueueEngine,
    store: Arc<dyn PlaybackStore>,
    overrides: PlaybackOverrides,
}

impl Session {
    /// Load the catalog, open the database and restore the last state
    pub async fn open(config: &CliConfig) -> Result<Self> {
        let catalog = Catalog::load(&config.library.catalog_path, config.library.duplicates)?;
        let store = cadence_storage::open(&config.storage.database_url).await?;
        Self::start(
            Arc::new(catalog),
            Arc::new(store),
            config.playback,
            Box::new(LoggingSink),
        )
        .await
    }

    /// Build a session from its parts and restore the stored state
    pub async fn start(
        catalog: Arc<Catalog>,
        store: Arc<dyn PlaybackStore>,
        overrides: PlaybackOverrides,
        sink: Box<dyn PlaybackSink>,
    ) -> Result<Self> {
        let mut settings = store.load_settings().await?;
        overrides.apply(&mut settings);

        let mut engine = QueueEngine::new(catalog, settings, sink);
        match engine.restore_from(Arc::clone(&store)).await {
            Ok(true) => info!("Restored previous playback state"),
            Ok(false) => info!("No previous playback state"),
            Err(e) => {
                // A broken snapshot must not keep the player from starting
                warn!("Could not restore playback state: {}", e);
                engine.mark_restored();
            }
        }

        Ok(Self {
            engine,
            store,
            overrides,
        })
    }

    pub fn engine(&self) -> &QueueEngine {
        &self.engine
    }

    /// Persist the current playback state
    pub async fn save(&self) -> Result<()> {
        self.engine.save_to(Arc::clone(&self.store)).await?;
        Ok(())
    }

    /// Run one action and return what to print
    pub async fn execute(&mut self, action: Action) -> Result<String> {
        let engine = &mut self.engine;
        let output = match action {
            Action::Play { song_id, within } => {
                require(engine.play_song(song_id, within.into()), || {
                    format!("no song with id {song_id}")
                })?;
                self.now_playing()
            }
            Action::PlayScope { kind, id, shuffle } => {
                let scope = scope_for(kind, id)?;
                require(engine.play_scope(scope, shuffle), || {
                    format!("nothing to play in {kind:?} {}", id.unwrap_or_default())
                })?;
                self.now_playing()
            }
            Action::ShuffleAll => {
                require(engine.shuffle_all_songs(), || "the library is empty".to_string())?;
                self.now_playing()
            }
            Action::Next => {
                engine.advance();
                self.now_playing()
            }
            Action::Prev => {
                engine.retreat();
                self.now_playing()
            }
            Action::Pause => {
                engine.set_playing(false);
                self.now_playing()
            }
            Action::Resume => {
                engine.set_playing(true);
                self.now_playing()
            }
            Action::Toggle => {
                engine.toggle_playing();
                self.now_playing()
            }
            Action::Ended => {
                engine.on_track_ended();
                self.now_playing()
            }
            Action::Seek { position_ms } => {
                engine.seek_to(Duration::from_millis(position_ms));
                self.now_playing()
            }
            Action::Position { position_ms } => {
                require(engine.set_position(Duration::from_millis(position_ms)), || {
                    "position is past the end of the song".to_string()
                })?;
                self.now_playing()
            }
            Action::Shuffle { state, switch_song } => {
                engine.set_shuffling(state == Switch::On, !switch_song);
                self.status()
            }
            Action::Loop { mode } => {
                let mode: LoopMode = match mode {
                    Some(mode) => {
                        engine.set_loop_mode(mode.into());
                        mode.into()
                    }
                    None => engine.cycle_loop_mode(),
                };
                format!("loop: {mode}")
            }
            Action::Volume { level } => {
                engine.set_volume(level);
                format!("volume: {}", engine.volume().level())
            }
            Action::Mute => {
                engine.mute();
                "muted".to_string()
            }
            Action::Unmute => {
                engine.unmute();
                format!("volume: {}", engine.volume().level())
            }
            Action::Queue { op } => {
                self.edit_queue(op)?;
                self.status()
            }
            Action::Settings { op } => self.settings(op).await?,
            Action::List { kind } => self.list(kind),
            Action::Status => self.status(),
            Action::Forget => {
                self.store.clear_snapshot().await?;
                "stored playback state cleared".to_string()
            }
        };
        Ok(output)
    }

    fn edit_queue(&mut self, op: QueueOp) -> Result<()> {
        let kind = |priority: bool| {
            if priority {
                QueueKind::Priority
            } else {
                QueueKind::Primary
            }
        };
        let engine = &mut self.engine;
        match op {
            QueueOp::Add { song_ids } => {
                let added = engine.add_songs_to_priority_queue(&song_ids);
                require(added == song_ids.len(), || {
                    format!("{} of {} songs are not in the library", song_ids.len() - added, song_ids.len())
                })
            }
            QueueOp::Remove { index, priority } => {
                require(engine.remove_at(kind(priority), index), || {
                    format!("no queue item at {index}")
                })
            }
            QueueOp::Move { from, to, priority } => {
                require(engine.move_item(kind(priority), from, to), || {
                    format!("cannot move {from} to {to}")
                })
            }
            QueueOp::Insert {
                index,
                song_id,
                priority,
            } => require(engine.insert_at(kind(priority), index, song_id), || {
                format!("cannot insert song {song_id} at {index}")
            }),
            QueueOp::ClearPriority => {
                engine.clear_priority_queue();
                Ok(())
            }
        }
    }

    async fn settings(&mut self, op: SettingsOp) -> Result<String> {
        if let SettingsOp::Set { key, value } = op {
            // Bare words are taken as JSON strings
            let value = serde_json::from_str(&value).unwrap_or(serde_json::Value::String(value));
            self.store.save_setting(&key, &value).await?;

            let mut settings = self.store.load_settings().await?;
            self.overrides.apply(&mut settings);
            self.engine.set_settings(settings);
        }

        let settings: &PlaybackSettings = self.engine.settings();
        let mut out = String::new();
        for (key, value) in settings.entries() {
            let _ = writeln!(out, "{key} = {value}");
        }
        Ok(out.trim_end().to_string())
    }

    /// Every entity of one kind, in search order
    fn list(&self, kind: ListKind) -> String {
        let catalog = self.engine.catalog();
        let key = self.engine.settings().search_sort;
        let mut out = String::new();
        match kind {
            ListKind::Songs => {
                let songs: Vec<_> = catalog.songs().iter().collect();
                for song in sorted(&songs, key) {
                    let album = catalog.album_of(song).map_or("", |a| a.name.as_str());
                    let _ = writeln!(out, "{:>5}  {} ({})", song.id, song.name, album);
                }
            }
            ListKind::Albums => {
                let albums: Vec<_> = catalog.albums().iter().collect();
                for album in sorted(&albums, key) {
                    let _ = writeln!(out, "{:>5}  {} [{}]", album.id, album.name, album.year);
                }
            }
            ListKind::Artists => {
                let artists: Vec<_> = catalog.artists().iter().collect();
                for artist in sorted(&artists, key) {
                    let _ = writeln!(out, "{:>5}  {}", artist.id, artist.sort_name());
                }
            }
            ListKind::Genres => {
                let genres: Vec<_> = catalog.genres().iter().collect();
                for genre in sorted(&genres, key) {
                    let _ = writeln!(out, "{:>5}  {}", genre.id, genre.sort_name());
                }
            }
        }
        out.trim_end().to_string()
    }

    fn song_label(&self, id: SongId) -> String {
        let catalog = self.engine.catalog();
        match catalog.song(id) {
            Some(song) => {
                let album = catalog.album_of(song);
                let artist = album.and_then(|a| catalog.artist_of(a));
                format!(
                    "{} - {} ({})",
                    artist.map_or("?", |a| a.name.as_str()),
                    song.name,
                    album.map_or("?", |a| a.name.as_str()),
                )
            }
            None => format!("#{id}"),
        }
    }

    fn now_playing(&self) -> String {
        let state = self.engine.state();
        match state.current_song() {
            Some(id) => format!(
                "{} {} [{}]",
                if state.is_playing() { "playing" } else { "paused " },
                self.song_label(id),
                clock(state.position()),
            ),
            None => "nothing playing".to_string(),
        }
    }

    /// Multi-line report of the whole playback state
    pub fn status(&self) -> String {
        let state = self.engine.state();
        let mut out = self.now_playing();

        let _ = write!(
            out,
            "\nscope: {:?}  loop: {}  shuffle: {}  volume: {}{}",
            state.scope(),
            state.loop_mode(),
            if state.is_shuffling() { "on" } else { "off" },
            self.engine.volume().level(),
            if self.engine.volume().is_muted() { " (muted)" } else { "" },
        );

        if !state.priority_queue().is_empty() {
            out.push_str("\nup next:");
            for (i, &id) in state.priority_queue().iter().enumerate() {
                let _ = write!(out, "\n  p{i:<3} {}", self.song_label(id));
            }
        }

        let _ = write!(out, "\nqueue ({} songs):", state.queue().len());
        for (i, &id) in state.queue().iter().enumerate() {
            let marker = if i == state.index() && !state.in_priority_queue() {
                '>'
            } else {
                ' '
            };
            let _ = write!(out, "\n{marker} {i:<4} {}", self.song_label(id));
        }
        out
    }
}

fn require(ok: bool, message: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(CliError::Command(message()))
    }
}

fn scope_for(kind: ScopeKind, id: Option<i64>) -> Result<Scope> {
    let id = || id.ok_or_else(|| CliError::Command(format!("{kind:?} needs an id")));
    Ok(match kind {
        ScopeKind::All => Scope::AllSongs,
        ScopeKind::Album => Scope::Album(id()?),
        ScopeKind::Artist => Scope::Artist(id()?),
        ScopeKind::Genre => Scope::Genre(id()?),
    })
}

fn clock(position: Duration) -> String {
    let secs = position.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
