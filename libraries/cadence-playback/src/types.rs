//! The queue engine's mutable state

use crate::queue::PlayQueue;
use cadence_core::{LoopMode, PlaybackMode, Scope, SongId};
use std::time::Duration;

/// Everything the queue engine tracks about playback
///
/// Only the engine and the state codec construct or mutate this; everyone
/// else reads it through [`crate::QueueEngine::state`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub(crate) current_song: Option<SongId>,
    pub(crate) position_ms: u64,
    pub(crate) scope: Scope,
    pub(crate) mode: PlaybackMode,
    pub(crate) queue: PlayQueue,
    pub(crate) is_playing: bool,
    pub(crate) is_shuffling: bool,
    pub(crate) in_priority_queue: bool,
    pub(crate) loop_mode: LoopMode,
    pub(crate) has_played: bool,
    pub(crate) is_restored: bool,
}

impl PlaybackState {
    pub fn current_song(&self) -> Option<SongId> {
        self.current_song
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms)
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    /// Entity the primary queue was derived from
    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Primary queue
    pub fn queue(&self) -> &[SongId] {
        self.queue.primary()
    }

    pub fn priority_queue(&self) -> &[SongId] {
        self.queue.priority()
    }

    /// Position of the current song in the primary queue
    ///
    /// Not meaningful while [`Self::in_priority_queue`] is set.
    pub fn index(&self) -> usize {
        self.queue.index()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    pub fn in_priority_queue(&self) -> bool {
        self.in_priority_queue
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Whether anything started playing in this process
    pub fn has_played(&self) -> bool {
        self.has_played
    }

    /// Whether a restore (or an empty-store check) has completed
    pub fn is_restored(&self) -> bool {
        self.is_restored
    }
}
