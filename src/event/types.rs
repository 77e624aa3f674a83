//! Event data model: one performance instruction at an absolute tick.

use std::fmt;

/// What an event does when its tick is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A note with its full length; the transport turns it into note-on/note-off.
    Note {
        channel: u8,
        pitch: u8,
        velocity: u8,
        duration: u64,
    },
    Controller {
        channel: u8,
        param: u32,
        value: u32,
    },
    ProgramChange {
        channel: u8,
        program: u32,
    },
    Tempo {
        bpm: u32,
    },
    /// End of the piece; playback stops when it is reached.
    End,
}

/// A single event of an [`EventSequence`](super::EventSequence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Absolute time in ticks.
    pub tick: u64,
    pub kind: EventKind,
    /// First event of an endlessly repeated body.
    pub start_loop: bool,
    /// Last event of an endlessly repeated body.
    pub end_loop: bool,
    /// Length of one pass through the loop body, set on the `end_loop` event.
    pub loop_offset: u64,
}

impl Event {
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self {
            tick,
            kind,
            start_loop: false,
            end_loop: false,
            loop_offset: 0,
        }
    }

    pub fn note(tick: u64, channel: u8, pitch: u8, velocity: u8, duration: u64) -> Self {
        Self::new(
            tick,
            EventKind::Note {
                channel,
                pitch,
                velocity,
                duration,
            },
        )
    }

    pub fn controller(tick: u64, channel: u8, param: u32, value: u32) -> Self {
        Self::new(
            tick,
            EventKind::Controller {
                channel,
                param,
                value,
            },
        )
    }

    pub fn program_change(tick: u64, channel: u8, program: u32) -> Self {
        Self::new(tick, EventKind::ProgramChange { channel, program })
    }

    pub fn tempo(tick: u64, bpm: u32) -> Self {
        Self::new(tick, EventKind::Tempo { bpm })
    }

    pub fn end(tick: u64) -> Self {
        Self::new(tick, EventKind::End)
    }

    /// The same event moved `ticks` later.
    pub fn shifted(&self, ticks: u64) -> Self {
        Self {
            tick: self.tick.saturating_add(ticks),
            ..*self
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self.kind, EventKind::Note { .. })
    }

    /// Lengthen a note event; no effect on other kinds.
    pub fn extend(&mut self, ticks: u64) {
        if let EventKind::Note { duration, .. } = &mut self.kind {
            *duration = duration.saturating_add(ticks);
        }
    }

    fn loop_tag(&self) -> &'static str {
        match (self.start_loop, self.end_loop) {
            (true, true) => " L-START-END",
            (true, false) => " L-START",
            (false, true) => " L-END",
            (false, false) => "",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.loop_tag();
        let t = self.tick;
        match self.kind {
            EventKind::Note {
                channel,
                pitch,
                velocity,
                duration,
            } => write!(
                f,
                "(NOTE{tag} t:{t} ch:{channel} d:{duration} n:{pitch} v:{velocity})"
            ),
            EventKind::Controller {
                channel,
                param,
                value,
            } => write!(f, "(CC{tag} t:{t} ch:{channel} p:{param} v:{value})"),
            EventKind::ProgramChange { channel, program } => {
                write!(f, "(PGM{tag} t:{t} ch:{channel} v:{program})")
            }
            EventKind::Tempo { bpm } => write!(f, "(TEMPO{tag} t:{t} bpm:{bpm})"),
            EventKind::End => write!(f, "(END{tag} t:{t})"),
        }
    }
}
