//! Korlessa: a compact music notation compiled to MIDI events and played in real time.

pub mod cli;
pub mod config;
pub mod dsl;
pub mod error;
pub mod event;
pub mod logging;
pub mod midi;
pub mod player;

pub use error::{Error, Result};
