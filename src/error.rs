//! Top-level error for the command-line pipeline.

use std::io;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::dsl::ParseError;
use crate::midi::MidiError;
use crate::player::PlayerError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Midi(#[from] MidiError),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("failed opening file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed reading from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed installing interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("use -c to connect to a device")]
    NoTarget,
}

pub type Result<T> = std::result::Result<T, Error>;
