//! Command-line grammar
//!
//! The same [`Action`]s are accepted as one-shot subcommands and as lines in
//! `cadence shell`.

use cadence_core::{LoopMode, PlaybackMode, SongId};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence local music playback engine", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ./cadence.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read commands from stdin, one per line, keeping one engine alive
    Shell,

    #[command(flatten)]
    Action(Action),
}

/// One line of `cadence shell`
#[derive(Debug, Parser)]
#[command(name = "cadence", no_binary_name = true, disable_help_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Play a song inside its album, artist, genre or the whole library
    Play {
        song_id: SongId,
        #[arg(short, long, value_enum, default_value_t = ModeArg::All)]
        within: ModeArg,
    },
    /// Play every song of an album, artist or genre from the top
    PlayScope {
        #[arg(value_enum)]
        kind: ScopeKind,
        /// Entity id (ignored for `all`)
        id: Option<i64>,
        #[arg(short, long)]
        shuffle: bool,
    },
    /// Shuffle the whole library
    ShuffleAll,
    /// Next track
    Next,
    /// Previous track (restarts the song after 3 seconds)
    Prev,
    Pause,
    Resume,
    /// Toggle play/pause
    Toggle,
    /// The current song finished playing
    Ended,
    /// Jump to a position in the current song
    Seek { position_ms: u64 },
    /// Report playback progress without seeking
    Position { position_ms: u64 },
    /// Turn shuffle on or off
    Shuffle {
        #[arg(value_enum)]
        state: Switch,
        /// Let another song become current instead of keeping this one
        #[arg(long)]
        switch_song: bool,
    },
    /// Set the loop mode, or cycle it when no mode is given
    Loop {
        #[arg(value_enum)]
        mode: Option<LoopArg>,
    },
    /// Set the volume (0-100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },
    Mute,
    Unmute,
    /// Edit the queues
    Queue {
        #[command(subcommand)]
        op: QueueOp,
    },
    /// Show or change playback preferences
    Settings {
        #[command(subcommand)]
        op: SettingsOp,
    },
    /// List library entities with their ids
    List {
        #[arg(value_enum, default_value_t = ListKind::Songs)]
        kind: ListKind,
    },
    /// Show what is playing and what is queued
    Status,
    /// Drop the stored playback state
    Forget,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum QueueOp {
    /// Append songs to the priority queue
    Add { song_ids: Vec<SongId> },
    /// Remove the item at a position
    Remove {
        index: usize,
        #[arg(short, long)]
        priority: bool,
    },
    /// Move an item to another position
    Move {
        from: usize,
        to: usize,
        #[arg(short, long)]
        priority: bool,
    },
    /// Insert a song at a position
    Insert {
        index: usize,
        song_id: SongId,
        #[arg(short, long)]
        priority: bool,
    },
    /// Empty the priority queue
    ClearPriority,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum SettingsOp {
    Show,
    /// Store one preference; the value is JSON or a bare word
    Set { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    All,
    Genre,
    Artist,
    Album,
}

impl From<ModeArg> for PlaybackMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::All => PlaybackMode::AllSongs,
            ModeArg::Genre => PlaybackMode::InGenre,
            ModeArg::Artist => PlaybackMode::InArtist,
            ModeArg::Album => PlaybackMode::InAlbum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeKind {
    All,
    Album,
    Artist,
    Genre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoopArg {
    None,
    All,
    Track,
}

impl From<LoopArg> for LoopMode {
    fn from(mode: LoopArg) -> Self {
        match mode {
            LoopArg::None => LoopMode::None,
            LoopArg::All => LoopMode::All,
            LoopArg::Track => LoopMode::Track,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Songs,
    Albums,
    Artists,
    Genres,
}

impl Action {
    /// Whether the playback state may change, so it must be saved afterwards
    pub fn mutates_state(&self) -> bool {
        !matches!(
            self,
            Action::Status
                | Action::List { .. }
                | Action::Settings { .. }
                | Action::Forget
                | Action::Volume { .. }
                | Action::Mute
                | Action::Unmute
        )
    }
}

impl ShellLine {
    /// Parse one shell line; `None` for blank lines and comments
    pub fn parse_line(line: &str) -> Option<Result<Action, clap::Error>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(Self::try_parse_from(line.split_whitespace()).map(|parsed| parsed.action))
    }
}
