//! MIDI output: port enumeration, target matching and the live connection.

use std::fmt;
use std::str::FromStr;

use midir::{MidiOutput as MidirOutput, MidiOutputConnection};

use super::message::MidiMessage;

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("MIDI init: {0}")]
    Init(String),
    #[error("no MIDI output ports available")]
    NoPorts,
    #[error("MIDI port matching '{0}' not found")]
    PortNotFound(Target),
    #[error("MIDI connect: {0}")]
    Connect(String),
    #[error("MIDI send: {0}")]
    Send(String),
    #[error("invalid MIDI target '{0}'")]
    InvalidTarget(String),
}

/// Something that accepts encoded MIDI messages.
pub trait MidiSink {
    fn send(&mut self, message: &MidiMessage) -> Result<(), MidiError>;
}

/// An output port as listed by the MIDI backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub index: usize,
    pub name: String,
}

/// Which output port to connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `client:port`, matched against the address ALSA appends to port names.
    Address { client: u32, port: u32 },
    /// Position in the port list.
    Index(usize),
    /// Substring of the port name.
    Name(String),
}

impl Target {
    pub fn matches(&self, port: &PortInfo) -> bool {
        match self {
            Target::Address { client, port: p } => {
                port.name.ends_with(&format!(" {client}:{p}"))
            }
            Target::Index(index) => port.index == *index,
            Target::Name(name) => port.name.contains(name.as_str()),
        }
    }
}

impl FromStr for Target {
    type Err = MidiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MidiError::InvalidTarget(s.to_string()));
        }
        if let Some((client, port)) = s.split_once(':') {
            if let (Ok(client), Ok(port)) = (client.parse(), port.parse()) {
                return Ok(Target::Address { client, port });
            }
        }
        if let Ok(index) = s.parse() {
            return Ok(Target::Index(index));
        }
        Ok(Target::Name(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Address { client, port } => write!(f, "{client}:{port}"),
            Target::Index(index) => write!(f, "{index}"),
            Target::Name(name) => write!(f, "{name}"),
        }
    }
}

/// First port matching `target`.
pub fn find_port<'p>(ports: &'p [PortInfo], target: &Target) -> Option<&'p PortInfo> {
    ports.iter().find(|p| target.matches(p))
}

/// List all available MIDI output ports.
pub fn list_ports(client_name: &str) -> Result<Vec<PortInfo>, MidiError> {
    let midi_out = MidirOutput::new(client_name).map_err(|e| MidiError::Init(e.to_string()))?;
    Ok(midi_out
        .ports()
        .iter()
        .enumerate()
        .map(|(index, p)| PortInfo {
            index,
            name: midi_out
                .port_name(p)
                .unwrap_or_else(|_| "unknown".to_string()),
        })
        .collect())
}

/// Active MIDI output connection.
pub struct MidiOutput {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidiOutput {
    /// Open a client named `client_name` and connect it to the port matching `target`.
    pub fn connect(client_name: &str, target: &Target) -> Result<Self, MidiError> {
        let midi_out =
            MidirOutput::new(client_name).map_err(|e| MidiError::Init(e.to_string()))?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(MidiError::NoPorts);
        }

        let infos: Vec<PortInfo> = ports
            .iter()
            .enumerate()
            .map(|(index, p)| PortInfo {
                index,
                name: midi_out.port_name(p).unwrap_or_default(),
            })
            .collect();
        let info = find_port(&infos, target)
            .cloned()
            .ok_or_else(|| MidiError::PortNotFound(target.clone()))?;
        let port = &ports[info.index];

        let connection = midi_out
            .connect(port, &format!("{client_name}-out"))
            .map_err(|e| MidiError::Connect(e.to_string()))?;
        log::info!("connected to MIDI port {}", info.name);

        Ok(Self {
            connection,
            port_name: info.name,
        })
    }

    /// Get the connected port name.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiSink for MidiOutput {
    fn send(&mut self, message: &MidiMessage) -> Result<(), MidiError> {
        self.connection
            .send(&message.to_bytes())
            .map_err(|e| MidiError::Send(e.to_string()))
    }
}
