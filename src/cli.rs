//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::midi::{MidiError, Target};

/// Korlessa is a notation to MIDI events translator.
#[derive(Parser, Debug)]
#[command(name = "korlessa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print additional debug info
    #[arg(long)]
    pub debug: bool,

    /// Print the tree produced by the parser and quit
    #[arg(long)]
    pub print_ast: bool,

    /// Print the translated events and quit
    #[arg(long)]
    pub print_events: bool,

    /// List MIDI output ports to connect to
    #[arg(short, long)]
    pub list: bool,

    /// Read notation from a file instead of stdin
    #[arg(short, long, value_name = "FILENAME", conflicts_with = "source")]
    pub file: Option<PathBuf>,

    /// Use this notation instead of stdin
    #[arg(short, long, value_name = "CODE")]
    pub source: Option<String>,

    /// Port to connect to: <client>:<port>, a port index or part of a port name
    #[arg(short = 'c', long, value_name = "ADDRESS")]
    pub connect_to: Option<String>,

    /// Client id to connect to
    #[arg(long, value_name = "CLIENT_ID")]
    pub client: Option<u32>,

    /// Port of the client to connect to
    #[arg(long, value_name = "PORT_ID", requires = "client")]
    pub port: Option<u32>,

    /// Configuration file (default: ~/.korlessa/config.yaml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Whether this run plays to a device rather than printing or listing.
    pub fn needs_device(&self) -> bool {
        !(self.print_ast || self.print_events || self.list)
    }

    /// The port to play to: `--connect-to`, then `--client`/`--port`, then the configured target.
    pub fn target(&self, config: &Config) -> Result<Option<Target>, MidiError> {
        if let Some(address) = &self.connect_to {
            return address.parse().map(Some);
        }
        if let Some(client) = self.client {
            return Ok(Some(Target::Address {
                client,
                port: self.port.unwrap_or(0),
            }));
        }
        config.midi.target.as_deref().map(str::parse).transpose()
    }
}
