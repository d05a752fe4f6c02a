//! Playback events
//!
//! The queue engine emits one event per changed field, synchronously and in
//! subscription order, before the mutating call returns. Observers register
//! on the [`EventBus`] and stay registered for as long as they hold the
//! returned [`Subscription`].

use cadence_core::{LoopMode, PlaybackMode, Scope, SongId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Events emitted by the queue engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Current song replaced (or cleared)
    CurrentSongChanged { song_id: Option<SongId> },

    /// Passive position update
    PositionChanged { position_ms: u64 },

    /// Explicit seek; the sink was told to jump
    Seeked { position_ms: u64 },

    PlayingChanged { is_playing: bool },

    ShufflingChanged { is_shuffling: bool },

    LoopModeChanged { loop_mode: LoopMode },

    /// Parent scope and mode of the active queue
    ScopeChanged { scope: Scope, mode: PlaybackMode },

    /// Primary queue edited or rebuilt
    QueueChanged { length: usize },

    /// Priority queue edited or consumed
    PriorityQueueChanged { length: usize },

    IndexChanged { index: usize },

    InPriorityQueueChanged { in_priority_queue: bool },

    VolumeChanged { level: u8, is_muted: bool },

    /// A snapshot (or an empty store) finished restoring
    Restored,
}

type Callback = Arc<dyn Fn(&PlaybackEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Fan-out of engine events to registered callbacks
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<Listeners>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    // A panicking callback never runs under the lock
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it is removed when the subscription drops
    #[must_use = "dropping the subscription unregisters the callback"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PlaybackEvent) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.callbacks.insert(id, Arc::new(callback));

        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Deliver `event` to every callback in registration order
    ///
    /// Callbacks may subscribe or unsubscribe while being called; the change
    /// applies from the next event.
    pub fn emit(&self, event: &PlaybackEvent) {
        let callbacks: Vec<Callback> = lock(&self.listeners).callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).callbacks.len()
    }
}

/// Registration handle returned by [`EventBus::subscribe`]
///
/// Holds only a weak reference to the bus, so an outstanding subscription
/// never keeps the engine's bus alive.
#[derive(Debug)]
pub struct Subscription {
    listeners: Weak<Mutex<Listeners>>,
    id: u64,
}

impl Subscription {
    /// Whether the bus still exists
    pub fn is_active(&self) -> bool {
        self.listeners.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(&listeners).callbacks.remove(&self.id);
        }
    }
}
