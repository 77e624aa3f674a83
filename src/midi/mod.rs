//! MIDI output: wire messages and the `midir` connection.

pub mod message;
pub mod output;

pub use message::MidiMessage;
pub use output::{find_port, list_ports, MidiError, MidiOutput, MidiSink, PortInfo, Target};
