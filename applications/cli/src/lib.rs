//! Cadence command-line player
//!
//! Drives a [`cadence_playback::QueueEngine`] against a catalog exported to
//! JSON and a SQLite store. Without an audio backend the engine talks to a
//! [`LoggingSink`].

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod sink;

pub use commands::{Action, Cli, Command, ShellLine};
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use session::Session;
pub use sink::LoggingSink;
