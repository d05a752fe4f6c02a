//! Queue engine - the single owner and mutator of playback state
//!
//! Every public operation runs synchronously, emits one [`PlaybackEvent`]
//! per field it touched, and issues whatever sink commands the new state
//! requires. Invalid input is reported as `false` and leaves the state as
//! it was; sink failures are logged and never abort an operation.

use crate::codec::{self, song_hashes};
use crate::error::Result;
use crate::events::{EventBus, PlaybackEvent, Subscription};
use crate::queue::QueueKind;
use crate::shuffle::shuffle_pinned;
use crate::sink::{PlaybackSink, TransportAction};
use crate::types::PlaybackState;
use crate::volume::Volume;
use cadence_core::sort::scope_songs;
use cadence_core::{
    Catalog, LoopMode, PlaybackMode, PlaybackSettings, PlaybackSnapshot, PlaybackStore, Scope,
    Song, SongId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// "Previous" restarts the current song once it has played this long
pub const REWIND_THRESHOLD_MS: u64 = 3000;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Playback state machine and queue engine
pub struct QueueEngine {
    catalog: Arc<Catalog>,
    settings: PlaybackSettings,
    sink: Box<dyn PlaybackSink>,
    events: EventBus,
    rng: StdRng,
    volume: Volume,
    state: PlaybackState,

    /// Song the sink currently has loaded
    loaded: Option<SongId>,
}

impl QueueEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        settings: PlaybackSettings,
        sink: Box<dyn PlaybackSink>,
    ) -> Self {
        Self {
            catalog,
            settings,
            sink,
            events: EventBus::new(),
            rng: StdRng::from_entropy(),
            volume: Volume::default(),
            state: PlaybackState::default(),
            loaded: None,
        }
    }

    /// Use a deterministic shuffle order
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ===== Observation =====

    /// Register an observer for as long as the returned guard lives
    #[must_use = "dropping the subscription unregisters the callback"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PlaybackEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Read-only view of the playback state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Replace preferences; they apply from the next operation on
    pub fn set_settings(&mut self, settings: PlaybackSettings) {
        self.settings = settings;
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.state.current_song.and_then(|id| self.catalog.song(id))
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    // ===== Starting playback =====

    /// Play `song_id` inside the scope `mode` derives from it
    ///
    /// `InGenre` on a song without a genre falls back to all songs. The
    /// current shuffle state carries over when `keep_shuffle_across_songs`
    /// is set, with the chosen song pinned to the front.
    pub fn play_song(&mut self, song_id: SongId, mode: PlaybackMode) -> bool {
        let catalog = Arc::clone(&self.catalog);
        let Some(song) = catalog.song(song_id) else {
            debug!("play_song: unknown song {}", song_id);
            return false;
        };

        let mut scope = catalog.scope_of(song, mode);
        let mut songs = scope_songs(&catalog, scope, &self.settings);
        if !songs.contains(&song_id) {
            scope = Scope::AllSongs;
            songs = scope_songs(&catalog, scope, &self.settings);
        }

        let shuffling = self.state.is_shuffling && self.settings.keep_shuffle_across_songs;
        let index = if shuffling {
            shuffle_pinned(&mut songs, Some(song_id), &mut self.rng);
            0
        } else {
            songs.iter().position(|&id| id == song_id).unwrap_or(0)
        };

        info!("Playing '{}' in {:?}", song.name, scope);
        self.state.queue.set_primary(songs, index);
        self.set_scope(scope);
        self.emit_queue();
        self.emit_index();
        self.set_in_priority_queue(false);
        self.set_shuffling_flag(shuffling);
        self.start_song(song_id, true);
        true
    }

    /// Play all songs of `scope` from the top
    pub fn play_scope(&mut self, scope: Scope, shuffled: bool) -> bool {
        let mut songs = scope_songs(&self.catalog, scope, &self.settings);
        if songs.is_empty() {
            debug!("play_scope: {:?} has no songs", scope);
            return false;
        }
        if shuffled {
            shuffle_pinned(&mut songs, None, &mut self.rng);
        }
        let first = songs[0];

        info!("Playing {:?} ({} songs, shuffled: {})", scope, songs.len(), shuffled);
        self.state.queue.set_primary(songs, 0);
        self.set_scope(scope);
        self.emit_queue();
        self.emit_index();
        self.set_in_priority_queue(false);
        self.set_shuffling_flag(shuffled);
        self.start_song(first, true);
        true
    }

    /// Shuffle the whole catalog
    pub fn shuffle_all_songs(&mut self) -> bool {
        self.play_scope(Scope::AllSongs, true)
    }

    // ===== Navigation =====

    /// Next track
    ///
    /// The priority queue goes first. At the end of the primary queue the
    /// index wraps to 0 and playback continues only with [`LoopMode::All`].
    pub fn advance(&mut self) {
        if let Some(next) = self.state.queue.pop_priority() {
            debug!("Advancing into priority song {}", next);
            self.emit_priority_queue();
            self.set_in_priority_queue(true);
            self.start_song(next, true);
            self.emit_queue();
            return;
        }

        if self.state.queue.primary().is_empty() {
            self.emit_queue();
            return;
        }

        self.set_in_priority_queue(false);
        let wrapped = self.state.queue.step_forward();
        self.emit_index();
        let play = !wrapped || self.state.loop_mode == LoopMode::All;
        if wrapped {
            debug!("Queue wrapped (loop: {})", self.state.loop_mode);
        }
        if let Some(id) = self.state.queue.current() {
            self.start_song(id, play);
        }
        self.emit_queue();
    }

    /// Previous track
    ///
    /// Restarts the current song instead when `rewind_on_previous` is set
    /// and it has played for [`REWIND_THRESHOLD_MS`]. From the priority
    /// queue, goes back to the primary song that was current before it.
    pub fn retreat(&mut self) {
        if self.settings.rewind_on_previous
            && self.state.current_song.is_some()
            && self.state.position_ms >= REWIND_THRESHOLD_MS
        {
            self.rewind();
            return;
        }

        if self.state.in_priority_queue {
            self.set_in_priority_queue(false);
        } else {
            self.state.queue.step_back();
            self.emit_index();
        }

        if let Some(id) = self.state.queue.current() {
            self.start_song(id, true);
        }
    }

    /// React to the sink finishing the current song
    pub fn on_track_ended(&mut self) {
        match (self.state.loop_mode, self.state.current_song) {
            (LoopMode::Track, Some(id)) => self.start_song(id, true),
            _ => self.advance(),
        }
    }

    /// React to a media button or notification action
    pub fn handle_transport(&mut self, action: TransportAction) {
        debug!("Transport action {:?}", action);
        match action {
            TransportAction::PlayPause => self.toggle_playing(),
            TransportAction::Play => self.set_playing(true),
            TransportAction::Pause => self.set_playing(false),
            TransportAction::Next => self.advance(),
            TransportAction::Previous => self.retreat(),
        }
    }

    // ===== Queue editing =====

    /// Remove the item at `index` from either queue
    ///
    /// Removing the current song hands over to the song that slides into its
    /// slot, keeping the play/pause state. Removing it from the end wraps to
    /// the front the way [`advance`](Self::advance) does.
    pub fn remove_at(&mut self, kind: QueueKind, index: usize) -> bool {
        let before = self.state.queue.index();
        match self.state.queue.remove(kind, index) {
            Ok(id) => {
                debug!("Removed song {} from {:?} queue", id, kind);
                let removed_current = kind == QueueKind::Primary
                    && index == before
                    && !self.state.in_priority_queue
                    && self.state.current_song == Some(id);
                let remaining = self.state.queue.primary().len();
                let wrapped = removed_current && remaining > 0 && index == remaining;
                if wrapped {
                    let _ = self.state.queue.set_index(0);
                }
                self.emit_edit(kind, before);
                if removed_current {
                    self.replace_removed_song(wrapped);
                }
                true
            }
            Err(e) => {
                debug!("remove_at rejected: {}", e);
                false
            }
        }
    }

    /// Move an item within either queue
    pub fn move_item(&mut self, kind: QueueKind, from: usize, to: usize) -> bool {
        let before = self.state.queue.index();
        match self.state.queue.move_item(kind, from, to) {
            Ok(()) => {
                self.emit_edit(kind, before);
                true
            }
            Err(e) => {
                debug!("move_item rejected: {}", e);
                false
            }
        }
    }

    /// Insert `song_id` at `index` (`index <= len`) in either queue
    pub fn insert_at(&mut self, kind: QueueKind, index: usize, song_id: SongId) -> bool {
        if self.catalog.song(song_id).is_none() {
            debug!("insert_at: unknown song {}", song_id);
            return false;
        }
        let before = self.state.queue.index();
        match self.state.queue.insert(kind, index, song_id) {
            Ok(()) => {
                self.emit_edit(kind, before);
                true
            }
            Err(e) => {
                debug!("insert_at rejected: {}", e);
                false
            }
        }
    }

    /// Append one song to the priority queue
    pub fn add_to_priority_queue(&mut self, song_id: SongId) -> bool {
        self.add_songs_to_priority_queue(&[song_id]) == 1
    }

    /// Append songs to the priority queue, skipping unknown ids
    ///
    /// Returns how many were added.
    pub fn add_songs_to_priority_queue(&mut self, song_ids: &[SongId]) -> usize {
        let known: Vec<SongId> = song_ids
            .iter()
            .copied()
            .filter(|&id| self.catalog.song(id).is_some())
            .collect();
        let added = known.len();
        if added > 0 {
            self.state.queue.extend_priority(known);
            self.emit_priority_queue();
        }
        added
    }

    pub fn clear_priority_queue(&mut self) {
        self.state.queue.clear_priority();
        self.emit_priority_queue();
    }

    // ===== Modes =====

    /// Turn shuffling on or off
    ///
    /// Enabling reshuffles the primary queue; with `keep_current_song` the
    /// current song moves to the front, joining the queue if it was playing
    /// from the priority queue. Disabling rebuilds the sorted queue of the
    /// current scope; with `keep_current_song` the index follows the current
    /// song. Without it, the song at the new index becomes current.
    pub fn set_shuffling(&mut self, enabled: bool, keep_current_song: bool) {
        let current = self.state.current_song;
        if enabled {
            let mut songs = self.state.queue.primary().to_vec();
            let pinned = if keep_current_song { current } else { None };
            let pinned_in_queue = shuffle_pinned(&mut songs, pinned, &mut self.rng);
            if let (Some(id), false) = (pinned, pinned_in_queue) {
                songs.insert(0, id);
            }
            self.state.queue.set_primary(songs, 0);
            if pinned.is_some() && self.state.in_priority_queue {
                self.set_in_priority_queue(false);
            }
        } else {
            let rebuilt = scope_songs(&self.catalog, self.state.scope, &self.settings);
            if rebuilt.is_empty() {
                debug!("Scope {:?} is gone, keeping queue order", self.state.scope);
            } else {
                let prior = self.state.queue.index();
                let index = current
                    .filter(|_| keep_current_song)
                    .and_then(|id| rebuilt.iter().position(|&song| song == id))
                    .unwrap_or(prior);
                self.state.queue.set_primary(rebuilt, index);
            }
        }

        self.set_shuffling_flag(enabled);
        self.emit_queue();
        self.emit_index();

        if !keep_current_song {
            if let Some(id) = self.state.queue.current().filter(|&id| Some(id) != current) {
                self.set_in_priority_queue(false);
                self.start_song(id, self.state.is_playing);
            }
        }
    }

    pub fn set_loop_mode(&mut self, loop_mode: LoopMode) {
        self.state.loop_mode = loop_mode;
        self.emit(PlaybackEvent::LoopModeChanged { loop_mode });
    }

    /// Step through None -> All -> Track
    pub fn cycle_loop_mode(&mut self) -> LoopMode {
        let next = self.state.loop_mode.cycle();
        self.set_loop_mode(next);
        next
    }

    // ===== Transport =====

    /// Start or pause playback of the current song
    ///
    /// Starting with no current song picks the song at the index.
    pub fn set_playing(&mut self, playing: bool) {
        if !playing {
            if self.loaded.is_some() {
                self.sink_command("pause", |sink| sink.pause());
            }
            self.set_playing_flag(false);
            return;
        }

        let Some(id) = self.state.current_song.or_else(|| self.state.queue.current()) else {
            debug!("Nothing to play");
            return;
        };
        if self.state.current_song != Some(id) {
            self.set_current_song(Some(id));
            self.set_position_field(0);
        }

        if self.loaded == Some(id) {
            self.sink_command("resume", |sink| sink.resume());
        } else {
            self.load(id, self.state.position_ms);
        }
        self.state.has_played = true;
        self.set_playing_flag(true);
    }

    pub fn toggle_playing(&mut self) {
        self.set_playing(!self.state.is_playing);
    }

    /// Passive position update from the sink
    ///
    /// Ignored (returns `false`) past the end of the current song.
    pub fn set_position(&mut self, position: Duration) -> bool {
        let ms = millis(position);
        let within = self
            .current_song()
            .is_some_and(|song| ms <= song.duration_ms);
        if within {
            self.set_position_field(ms);
        }
        within
    }

    /// Jump to `position` and tell the sink
    pub fn seek_to(&mut self, position: Duration) {
        let position_ms = millis(position);
        self.state.position_ms = position_ms;
        self.emit(PlaybackEvent::Seeked { position_ms });
        if self.loaded.is_some() && self.loaded == self.state.current_song {
            self.sink_command("seek", |sink| sink.seek(position));
        }
    }

    /// Restart the current song and play
    pub fn rewind(&mut self) {
        self.seek_to(Duration::ZERO);
        self.set_playing(true);
    }

    // ===== Volume =====

    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.apply_volume();
    }

    pub fn mute(&mut self) {
        self.volume.mute();
        self.apply_volume();
    }

    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    // ===== Persistence =====

    /// Flatten the current state for storage
    pub fn snapshot(&self) -> PlaybackSnapshot {
        codec::encode(&self.state, &self.catalog)
    }

    /// Replace the state with a decoded snapshot
    ///
    /// The restored song is left paused; the sink loads it on the next play.
    pub fn restore(&mut self, snapshot: &PlaybackSnapshot) {
        let state = codec::decode(snapshot, &self.catalog);
        if self.loaded.take().is_some() {
            self.sink_command("pause", |sink| sink.pause());
        }
        self.state = state;
        info!(
            "Restored {} queued songs ({} priority), current: {:?}",
            self.state.queue.primary().len(),
            self.state.queue.priority().len(),
            self.state.current_song
        );
        self.emit_all();
        self.emit(PlaybackEvent::Restored);
    }

    /// Mark restore as complete without a snapshot
    pub fn mark_restored(&mut self) {
        self.state.is_restored = true;
        self.emit(PlaybackEvent::Restored);
    }

    /// Load and apply the stored snapshot
    ///
    /// Returns whether a snapshot existed. On error the engine is untouched.
    pub async fn restore_from(&mut self, store: Arc<dyn PlaybackStore>) -> Result<bool> {
        match codec::load_in_background(store).await? {
            Some(snapshot) => {
                self.restore(&snapshot);
                Ok(true)
            }
            None => {
                self.mark_restored();
                Ok(false)
            }
        }
    }

    /// Snapshot now and save on a background task
    pub fn save_to(&self, store: Arc<dyn PlaybackStore>) -> impl Future<Output = Result<()>> {
        codec::save_in_background(store, self.snapshot())
    }

    /// Swap in a rescanned catalog
    ///
    /// The queue survives as far as its songs still resolve by hash. If the
    /// song the sink is playing survives as the current song, playback
    /// continues untouched.
    pub fn set_catalog(&mut self, catalog: Arc<Catalog>) {
        let snapshot = self.snapshot();
        let loaded_key = self.loaded.and_then(|id| song_hashes(&self.catalog, id));
        let was_playing = self.state.is_playing;
        let has_played = self.state.has_played;
        let is_restored = self.state.is_restored;

        self.catalog = catalog;
        let mut state = codec::decode(&snapshot, &self.catalog);
        state.has_played = has_played;
        state.is_restored = is_restored;

        let loaded = loaded_key
            .and_then(|(song, album)| self.catalog.find_song_by_hash(song, album))
            .map(|song| song.id);
        if loaded.is_some() && loaded == state.current_song {
            state.is_playing = was_playing;
            self.loaded = loaded;
        } else {
            if self.loaded.is_some() && was_playing {
                self.sink_command("pause", |sink| sink.pause());
            }
            self.loaded = None;
        }

        self.state = state;
        info!(
            "Catalog replaced, {} songs still queued",
            self.state.queue.primary().len()
        );
        self.emit_all();
    }

    // ===== Internals =====

    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(&event);
    }

    /// The current song left the primary queue; the song at the index
    /// takes over
    ///
    /// After a wrap to the front playback only continues with
    /// [`LoopMode::All`].
    fn replace_removed_song(&mut self, wrapped: bool) {
        match self.state.queue.current() {
            Some(next) => {
                let play = self.state.is_playing
                    && (!wrapped || self.state.loop_mode == LoopMode::All);
                self.start_song(next, play);
            }
            None => {
                self.set_current_song(None);
                self.set_position_field(0);
                if self.loaded.take().is_some() {
                    self.sink_command("pause", |sink| sink.pause());
                }
                self.set_playing_flag(false);
            }
        }
    }

    /// Make `id` current from the start, playing or paused
    fn start_song(&mut self, id: SongId, play: bool) {
        self.set_current_song(Some(id));
        self.set_position_field(0);
        if play {
            self.load(id, 0);
            self.state.has_played = true;
        } else if self.loaded.take().is_some() {
            self.sink_command("pause", |sink| sink.pause());
        }
        self.set_playing_flag(play);
    }

    fn load(&mut self, id: SongId, position_ms: u64) {
        let catalog = Arc::clone(&self.catalog);
        let Some(song) = catalog.song(id) else {
            warn!("Song {} vanished from the catalog", id);
            self.loaded = None;
            return;
        };
        match self
            .sink
            .load_and_play(song, Duration::from_millis(position_ms))
        {
            Ok(()) => self.loaded = Some(id),
            Err(e) => {
                warn!("Sink failed to load '{}': {}", song.name, e);
                self.loaded = None;
            }
        }
    }

    fn sink_command(&mut self, name: &str, command: impl FnOnce(&mut dyn PlaybackSink) -> Result<()>) {
        if let Err(e) = command(self.sink.as_mut()) {
            warn!("Sink {} failed: {}", name, e);
        }
    }

    fn apply_volume(&mut self) {
        let gain = self.volume.gain();
        self.sink_command("set_volume", |sink| sink.set_volume(gain));
        self.emit(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn set_current_song(&mut self, song_id: Option<SongId>) {
        self.state.current_song = song_id;
        self.emit(PlaybackEvent::CurrentSongChanged { song_id });
    }

    fn set_position_field(&mut self, position_ms: u64) {
        self.state.position_ms = position_ms;
        self.emit(PlaybackEvent::PositionChanged { position_ms });
    }

    fn set_playing_flag(&mut self, is_playing: bool) {
        self.state.is_playing = is_playing;
        self.emit(PlaybackEvent::PlayingChanged { is_playing });
    }

    fn set_shuffling_flag(&mut self, is_shuffling: bool) {
        self.state.is_shuffling = is_shuffling;
        self.emit(PlaybackEvent::ShufflingChanged { is_shuffling });
    }

    fn set_in_priority_queue(&mut self, in_priority_queue: bool) {
        self.state.in_priority_queue = in_priority_queue;
        self.emit(PlaybackEvent::InPriorityQueueChanged { in_priority_queue });
    }

    fn set_scope(&mut self, scope: Scope) {
        self.state.scope = scope;
        self.state.mode = scope.mode();
        self.emit(PlaybackEvent::ScopeChanged {
            scope,
            mode: self.state.mode,
        });
    }

    fn emit_queue(&self) {
        self.emit(PlaybackEvent::QueueChanged {
            length: self.state.queue.primary().len(),
        });
    }

    fn emit_priority_queue(&self) {
        self.emit(PlaybackEvent::PriorityQueueChanged {
            length: self.state.queue.priority().len(),
        });
    }

    fn emit_index(&self) {
        self.emit(PlaybackEvent::IndexChanged {
            index: self.state.queue.index(),
        });
    }

    fn emit_edit(&self, kind: QueueKind, index_before: usize) {
        match kind {
            QueueKind::Primary => self.emit_queue(),
            QueueKind::Priority => self.emit_priority_queue(),
        }
        if self.state.queue.index() != index_before {
            self.emit_index();
        }
    }

    fn emit_all(&self) {
        let state = &self.state;
        self.emit(PlaybackEvent::CurrentSongChanged {
            song_id: state.current_song,
        });
        self.emit(PlaybackEvent::PositionChanged {
            position_ms: state.position_ms,
        });
        self.emit(PlaybackEvent::ScopeChanged {
            scope: state.scope,
            mode: state.mode,
        });
        self.emit_queue();
        self.emit_priority_queue();
        self.emit_index();
        self.emit(PlaybackEvent::PlayingChanged {
            is_playing: state.is_playing,
        });
        self.emit(PlaybackEvent::ShufflingChanged {
            is_shuffling: state.is_shuffling,
        });
        self.emit(PlaybackEvent::InPriorityQueueChanged {
            in_priority_queue: state.in_priority_queue,
        });
        self.emit(PlaybackEvent::LoopModeChanged {
            loop_mode: state.loop_mode,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{RecordingSink, SinkCommand};
    use cadence_core::{DuplicatePolicy, MediaRecord};
    use std::sync::Mutex;

    fn catalog() -> Arc<Catalog> {
        let rows = (1..=5u32).map(|n| MediaRecord {
            id: i64::from(n),
            title: format!("Song {n}"),
            track: n,
            duration_ms: 200_000,
            album: "Album".to_string(),
            artist: "Artist".to_string(),
            year: 2001,
            genre: None,
        });
        Arc::new(Catalog::build(rows, DuplicatePolicy::Collapse))
    }

    fn engine() -> (QueueEngine, RecordingSink) {
        let sink = RecordingSink::new();
        let engine = QueueEngine::new(catalog(), PlaybackSettings::default(), Box::new(sink.clone()))
            .with_seed(3);
        (engine, sink)
    }

    #[test]
    fn play_song_starts_the_sink() {
        let (mut engine, sink) = engine();
        assert!(engine.play_song(3, PlaybackMode::InAlbum));

        assert_eq!(engine.state().current_song(), Some(3));
        assert_eq!(engine.state().index(), 2);
        assert!(engine.state().is_playing());
        assert_eq!(
            sink.commands(),
            vec![SinkCommand::LoadAndPlay { song_id: 3, start_ms: 0 }]
        );
    }

    #[test]
    fn unknown_song_is_rejected() {
        let (mut engine, sink) = engine();
        assert!(!engine.play_song(99, PlaybackMode::AllSongs));
        assert!(engine.state().current_song().is_none());
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn pause_then_resume_does_not_reload() {
        let (mut engine, sink) = engine();
        engine.play_song(1, PlaybackMode::InAlbum);
        sink.take();

        engine.set_playing(false);
        engine.set_playing(true);
        assert_eq!(sink.commands(), vec![SinkCommand::Pause, SinkCommand::Resume]);
    }

    #[test]
    fn wrap_without_loop_pauses() {
        let (mut engine, _sink) = engine();
        engine.play_song(5, PlaybackMode::InAlbum);
        engine.advance();

        assert_eq!(engine.state().index(), 0);
        assert_eq!(engine.state().current_song(), Some(1));
        assert!(!engine.state().is_playing());
    }

    #[test]
    fn wrap_with_loop_all_keeps_playing() {
        let (mut engine, _sink) = engine();
        engine.play_song(5, PlaybackMode::InAlbum);
        engine.set_loop_mode(LoopMode::All);
        engine.advance();

        assert_eq!(engine.state().current_song(), Some(1));
        assert!(engine.state().is_playing());
    }

    #[test]
    fn resume_after_paused_wrap_reloads() {
        let (mut engine, sink) = engine();
        engine.play_song(5, PlaybackMode::InAlbum);
        engine.advance();
        sink.take();

        engine.set_playing(true);
        assert_eq!(
            sink.commands(),
            vec![SinkCommand::LoadAndPlay { song_id: 1, start_ms: 0 }]
        );
    }

    #[test]
    fn retreat_rewinds_after_threshold() {
        let (mut engine, sink) = engine();
        engine.play_song(3, PlaybackMode::InAlbum);
        assert!(engine.set_position(Duration::from_millis(4_000)));
        sink.take();

        engine.retreat();
        assert_eq!(engine.state().current_song(), Some(3));
        assert_eq!(engine.state().position_ms(), 0);
        assert_eq!(
            sink.commands(),
            vec![SinkCommand::Seek { position_ms: 0 }, SinkCommand::Resume]
        );
    }

    #[test]
    fn retreat_moves_back_before_threshold() {
        let (mut engine, _sink) = engine();
        engine.play_song(3, PlaybackMode::InAlbum);
        engine.set_position(Duration::from_millis(2_999));
        engine.retreat();
        assert_eq!(engine.state().current_song(), Some(2));
    }

    #[test]
    fn retreat_without_rewind_setting_always_moves() {
        let (mut engine, _sink) = engine();
        let mut settings = PlaybackSettings::default();
        settings.rewind_on_previous = false;
        engine.set_settings(settings);
        engine.play_song(3, PlaybackMode::InAlbum);
        engine.set_position(Duration::from_millis(60_000));

        engine.retreat();
        assert_eq!(engine.state().current_song(), Some(2));
    }

    #[test]
    fn set_position_past_end_is_ignored() {
        let (mut engine, _sink) = engine();
        engine.play_song(1, PlaybackMode::InAlbum);
        assert!(!engine.set_position(Duration::from_millis(200_001)));
        assert_eq!(engine.state().position_ms(), 0);
        assert!(engine.set_position(Duration::from_millis(200_000)));
    }

    #[test]
    fn seek_is_unclamped_and_reaches_sink() {
        let (mut engine, sink) = engine();
        engine.play_song(1, PlaybackMode::InAlbum);
        sink.take();
        engine.seek_to(Duration::from_millis(900_000));
        assert_eq!(engine.state().position_ms(), 900_000);
        assert_eq!(sink.commands(), vec![SinkCommand::Seek { position_ms: 900_000 }]);
    }

    #[test]
    fn track_loop_restarts_on_end() {
        let (mut engine, _sink) = engine();
        engine.play_song(2, PlaybackMode::InAlbum);
        engine.set_loop_mode(LoopMode::Track);
        engine.set_position(Duration::from_millis(199_000));

        engine.on_track_ended();
        assert_eq!(engine.state().current_song(), Some(2));
        assert_eq!(engine.state().position_ms(), 0);
    }

    #[test]
    fn transport_actions_map_to_operations() {
        let (mut engine, _sink) = engine();
        engine.play_song(1, PlaybackMode::InAlbum);

        engine.handle_transport(TransportAction::PlayPause);
        assert!(!engine.state().is_playing());
        engine.handle_transport(TransportAction::Play);
        assert!(engine.state().is_playing());
        engine.handle_transport(TransportAction::Next);
        assert_eq!(engine.state().current_song(), Some(2));
        engine.handle_transport(TransportAction::Previous);
        assert_eq!(engine.state().current_song(), Some(1));
        engine.handle_transport(TransportAction::Pause);
        assert!(!engine.state().is_playing());
    }

    #[test]
    fn volume_is_forwarded_as_gain() {
        let (mut engine, sink) = engine();
        engine.set_volume(100);
        engine.mute();
        assert_eq!(
            sink.commands(),
            vec![
                SinkCommand::SetVolume { gain: 1.0 },
                SinkCommand::SetVolume { gain: 0.0 }
            ]
        );
        assert!(engine.volume().is_muted());
    }

    #[test]
    fn editing_emits_queue_notifications() {
        let (mut engine, _sink) = engine();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let _subscription = engine.subscribe(move |event| log.lock().unwrap().push(event.clone()));

        engine.play_song(1, PlaybackMode::InAlbum);
        seen.lock().unwrap().clear();

        assert!(engine.move_item(QueueKind::Primary, 3, 4));
        assert!(!engine.move_item(QueueKind::Primary, 3, 5));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![PlaybackEvent::QueueChanged { length: 5 }]
        );
    }

    #[test]
    fn priority_insert_and_clear() {
        let (mut engine, _sink) = engine();
        assert!(engine.add_to_priority_queue(4));
        assert!(!engine.add_to_priority_queue(40));
        assert_eq!(engine.add_songs_to_priority_queue(&[1, 77, 2]), 2);
        assert!(engine.insert_at(QueueKind::Priority, 0, 5));
        assert_eq!(engine.state().priority_queue(), &[5, 4, 1, 2]);

        engine.clear_priority_queue();
        assert!(engine.state().priority_queue().is_empty());
    }

    #[test]
    fn sink_failures_do_not_abort() {
        struct Broken;
        impl PlaybackSink for Broken {
            fn load_and_play(&mut self, _: &Song, _: Duration) -> Result<()> {
                Err(crate::PlaybackError::sink("no device"))
            }
            fn pause(&mut self) -> Result<()> {
                Err(crate::PlaybackError::sink("no device"))
            }
            fn resume(&mut self) -> Result<()> {
                Err(crate::PlaybackError::sink("no device"))
            }
            fn seek(&mut self, _: Duration) -> Result<()> {
                Err(crate::PlaybackError::sink("no device"))
            }
            fn set_volume(&mut self, _: f32) -> Result<()> {
                Err(crate::PlaybackError::sink("no device"))
            }
        }

        let mut engine = QueueEngine::new(catalog(), PlaybackSettings::default(), Box::new(Broken));
        assert!(engine.play_song(2, PlaybackMode::InAlbum));
        engine.advance();
        engine.set_volume(10);
        assert_eq!(engine.state().current_song(), Some(3));
    }
}
