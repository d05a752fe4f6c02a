use cadence_core::Song;
use cadence_playback::{PlaybackSink, Result};
use std::time::Duration;
use tracing::info;

/// Sink for hosts without an audio backend; logs every command
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl PlaybackSink for LoggingSink {
    fn load_and_play(&mut self, song: &Song, start: Duration) -> Result<()> {
        info!("sink: load '{}' (#{}) at {:?}", song.name, song.id, start);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        info!("sink: pause");
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        info!("sink: resume");
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        info!("sink: seek to {:?}", position);
        Ok(())
    }

    fn set_volume(&mut self, gain: f32) -> Result<()> {
        info!("sink: gain {:.3}", gain);
        Ok(())
    }
}
