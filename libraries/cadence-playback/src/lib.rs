//! Cadence - Playback Engine
//!
//! Platform-agnostic queue and playback state for Cadence.
//!
//! This crate provides:
//! - Two-tier queue (priority "play next" queue + primary scope queue)
//! - Shuffle with the current song pinned to the front
//! - Loop modes (None, All, Track)
//! - Volume control (logarithmic, 0-100, mute/unmute)
//! - Snapshot codec for persisting and restoring state by content hash
//! - Change notifications for UI layers
//!
//! # Architecture
//!
//! `cadence-playback` never touches audio devices or the database. Audio
//! output is a [`PlaybackSink`] supplied by the platform; persistence goes
//! through [`cadence_core::PlaybackStore`].
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Catalog, DuplicatePolicy, MediaRecord, PlaybackMode, PlaybackSettings};
//! use cadence_playback::{QueueEngine, RecordingSink};
//! use std::sync::Arc;
//!
//! let catalog = Catalog::build(
//!     vec![MediaRecord {
//!         id: 1,
//!         title: "Intro".to_string(),
//!         track: 1,
//!         duration_ms: 90_000,
//!         album: "Debut".to_string(),
//!         artist: "Band".to_string(),
//!         year: 1999,
//!         genre: None,
//!     }],
//!     DuplicatePolicy::Collapse,
//! );
//!
//! let sink = RecordingSink::new();
//! let mut engine = QueueEngine::new(
//!     Arc::new(catalog),
//!     PlaybackSettings::default(),
//!     Box::new(sink.clone()),
//! );
//!
//! let _subscription = engine.subscribe(|event| println!("{event:?}"));
//! assert!(engine.play_song(1, PlaybackMode::InAlbum));
//! assert!(engine.state().is_playing());
//! assert_eq!(sink.commands().len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod codec;
mod engine;
mod error;
mod events;
mod queue;
mod shuffle;
mod sink;
pub mod types;
mod volume;

// Public exports
pub use engine::{QueueEngine, REWIND_THRESHOLD_MS};
pub use error::{PlaybackError, Result};
pub use events::{EventBus, PlaybackEvent, Subscription};
pub use queue::{PlayQueue, QueueKind};
pub use shuffle::shuffle_pinned;
pub use sink::{PlaybackSink, RecordingSink, SinkCommand, TransportAction};
pub use types::PlaybackState;
pub use volume::Volume;
