//! MIDI channel messages and their wire encoding.
//!
//! Wire format:
//! - Note On:  [0x90 | channel, note, velocity]
//! - Note Off: [0x80 | channel, note, velocity]
//! - CC:       [0xB0 | channel, controller, value]
//! - Program:  [0xC0 | channel, program]
//!
//! Data bytes wider than 7 bits are clamped to 127; channels are masked to 4 bits.

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;

/// Controller number of the "all notes off" channel mode message.
pub const ALL_NOTES_OFF: u8 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
}

fn data(value: u32) -> u8 {
    value.min(0x7F) as u8
}

impl MidiMessage {
    /// Control change with wide parameter values clamped to the 7-bit range.
    pub fn control_change(channel: u8, controller: u32, value: u32) -> Self {
        MidiMessage::ControlChange {
            channel,
            controller: data(controller),
            value: data(value),
        }
    }

    pub fn program_change(channel: u8, program: u32) -> Self {
        MidiMessage::ProgramChange {
            channel,
            program: data(program),
        }
    }

    pub fn all_notes_off(channel: u8) -> Self {
        MidiMessage::ControlChange {
            channel,
            controller: ALL_NOTES_OFF,
            value: 0,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. } => channel,
        }
    }

    /// Encode to raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let status = |kind: u8| kind | (self.channel() & 0x0F);
        match *self {
            MidiMessage::NoteOn { note, velocity, .. } => {
                vec![status(NOTE_ON), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::NoteOff { note, .. } => vec![status(NOTE_OFF), note & 0x7F, 0],
            MidiMessage::ControlChange {
                controller, value, ..
            } => vec![status(CONTROL_CHANGE), controller & 0x7F, value & 0x7F],
            MidiMessage::ProgramChange { program, .. } => {
                vec![status(PROGRAM_CHANGE), program & 0x7F]
            }
        }
    }

    /// Decode raw bytes. Note On with velocity 0 decodes as Note Off.
    pub fn parse(msg: &[u8]) -> Option<Self> {
        let first = *msg.first()?;
        let status = first & 0xF0;
        let channel = first & 0x0F;

        match status {
            NOTE_ON if msg.len() >= 3 => {
                if msg[2] == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note: msg[1],
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note: msg[1],
                        velocity: msg[2],
                    })
                }
            }
            NOTE_OFF if msg.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: msg[1],
            }),
            CONTROL_CHANGE if msg.len() >= 3 => Some(MidiMessage::ControlChange {
                channel,
                controller: msg[1],
                value: msg[2],
            }),
            PROGRAM_CHANGE if msg.len() >= 2 => Some(MidiMessage::ProgramChange {
                channel,
                program: msg[1],
            }),
            _ => None,
        }
    }
}
