//! Playback sink abstraction
//!
//! The sink is whatever actually decodes and outputs audio. The queue engine
//! drives it with coarse commands; the platform reports transport events
//! back through [`QueueEngine::on_track_ended`] and
//! [`QueueEngine::handle_transport`].
//!
//! [`QueueEngine::on_track_ended`]: crate::QueueEngine::on_track_ended
//! [`QueueEngine::handle_transport`]: crate::QueueEngine::handle_transport

use crate::error::Result;
use cadence_core::{Song, SongId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Receiver of playback commands
pub trait PlaybackSink: Send {
    /// Load `song` and start playing from `start`
    fn load_and_play(&mut self, song: &Song, start: Duration) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    /// Resume the loaded song
    fn resume(&mut self) -> Result<()>;

    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Output gain as a linear fraction in `0.0..=1.0`
    fn set_volume(&mut self, gain: f32) -> Result<()>;
}

/// Media-button and notification actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportAction {
    PlayPause,
    Play,
    Pause,
    Next,
    Previous,
}

/// A command as received by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCommand {
    LoadAndPlay { song_id: SongId, start_ms: u64 },
    Pause,
    Resume,
    Seek { position_ms: u64 },
    SetVolume { gain: f32 },
}

/// Sink that only records what it was told
///
/// Clones share the same log, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Arc<Mutex<Vec<SinkCommand>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far
    pub fn commands(&self) -> Vec<SinkCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take and clear the received commands
    pub fn take(&self) -> Vec<SinkCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn record(&self, command: SinkCommand) -> Result<()> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
        Ok(())
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl PlaybackSink for RecordingSink {
    fn load_and_play(&mut self, song: &Song, start: Duration) -> Result<()> {
        self.record(SinkCommand::LoadAndPlay {
            song_id: song.id,
            start_ms: millis(start),
        })
    }

    fn pause(&mut self) -> Result<()> {
        self.record(SinkCommand::Pause)
    }

    fn resume(&mut self) -> Result<()> {
        self.record(SinkCommand::Resume)
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.record(SinkCommand::Seek {
            position_ms: millis(position),
        })
    }

    fn set_volume(&mut self, gain: f32) -> Result<()> {
        self.record(SinkCommand::SetVolume { gain })
    }
}
