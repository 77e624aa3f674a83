//! The seam between the player and whatever delivers events on time.

use std::time::Duration;

use crate::event::EventKind;
use crate::midi::MidiError;

/// An item handed to the transport for delivery at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Queued {
    Event(EventKind),
    /// Echoed back as [`Notification::Drained`] when its tick is reached.
    DrainMarker,
}

/// A signal coming back from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The end of the piece was reached.
    Stop,
    /// A drain marker was reached; the queue wants more events.
    Drained,
    /// A tempo event was reached.
    TempoChange { bpm: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Midi(#[from] MidiError),
    #[error("invalid tempo: {0} bpm")]
    InvalidTempo(u32),
    #[error("transport is not started")]
    NotStarted,
}

/// A timed event queue with a feedback channel.
///
/// Implementations deliver queued items when the queue clock reaches their
/// tick. Items addressed to the player (tempo changes, the end of the piece
/// and drain markers) come back through [`Transport::poll`].
pub trait Transport {
    /// Set the queue tempo; ticks run at 96 per quarter note.
    fn set_tempo(&mut self, bpm: u32) -> Result<(), TransportError>;
    /// Start the queue clock at tick 0.
    fn start(&mut self) -> Result<(), TransportError>;
    fn stop(&mut self) -> Result<(), TransportError>;
    /// Drop everything still pending.
    fn clear(&mut self) -> Result<(), TransportError>;
    fn enqueue(&mut self, tick: u64, item: Queued) -> Result<(), TransportError>;
    /// Push buffered items to the queue.
    fn flush(&mut self) -> Result<(), TransportError>;
    /// Wait up to `timeout` for notifications.
    fn poll(&mut self, timeout: Duration) -> Result<Vec<Notification>, TransportError>;
}
