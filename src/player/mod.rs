//! Real-time playback of an event sequence through a [`Transport`].
//!
//! The player keeps the transport a bounded distance ahead of the music.
//! It primes the queue with a first window of events, then waits for drain
//! markers it has interleaved with the events; each marker that comes back
//! triggers the next window. Looped sequences are walked with a
//! [`Cursor`] that shifts events by the accumulated loop length, so ticks
//! keep growing and a loop plays until cancelled.
//!
//! ```text
//!   Idle ─► Priming ─► Running ─► Stopping ─► Closed
//!              │          │          ▲
//!              └──error───┴──────────┘
//! ```

pub mod cancel;
pub mod queue;
pub mod sequencer;
pub mod transport;

pub use cancel::CancellationToken;
pub use sequencer::SequencerTransport;
pub use transport::{Notification, Queued, Transport, TransportError};

use std::fmt;
use std::time::Duration;

use crate::dsl::context::DEFAULT_BPM;
use crate::event::{Cursor, EventSequence};

pub const DEFAULT_QUEUE_SIZE: usize = 128;
pub const DEFAULT_DRAIN_SIZE: usize = 96;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(250);
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(1);

/// Playback tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSettings {
    /// Tempo until the first tempo event.
    pub bpm: u32,
    /// Items pushed when priming.
    pub queue_size: usize,
    /// Items pushed per drain marker; also the marker cadence.
    pub drain_size: usize,
    pub poll_timeout: Duration,
    /// Pause after stopping so the last messages reach the device.
    pub settle: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            queue_size: DEFAULT_QUEUE_SIZE,
            drain_size: DEFAULT_DRAIN_SIZE,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            settle: DEFAULT_SETTLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Priming,
    Running,
    Stopping,
    Closed,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerState::Idle => "idle",
            PlayerState::Priming => "priming",
            PlayerState::Running => "running",
            PlayerState::Stopping => "stopping",
            PlayerState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("transport failed while {state}: {source}")]
    Transport {
        state: PlayerState,
        #[source]
        source: TransportError,
    },
    #[error("player has already run")]
    AlreadyRun,
}

/// Where the next window starts.
#[derive(Debug, Clone, Copy, Default)]
struct DrainCursor {
    position: Cursor,
    /// Items pushed so far, markers included.
    pushed: usize,
}

pub struct Player<T: Transport> {
    transport: T,
    sequence: EventSequence,
    settings: PlayerSettings,
    state: PlayerState,
    cursor: DrainCursor,
}

impl<T: Transport> Player<T> {
    pub fn new(sequence: EventSequence, transport: T, settings: PlayerSettings) -> Self {
        Self {
            transport,
            sequence,
            settings,
            state: PlayerState::Idle,
            cursor: DrainCursor::default(),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sequence(&self) -> &EventSequence {
        &self.sequence
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Play until the piece ends or `cancel` fires.
    ///
    /// The transport is always cleared and stopped before returning, and the
    /// loop edge of the sequence is removed. The first error encountered is
    /// returned.
    pub fn run(&mut self, cancel: &CancellationToken) -> Result<(), PlayerError> {
        if self.state != PlayerState::Idle {
            return Err(PlayerError::AlreadyRun);
        }
        let played = self.prime().and_then(|()| self.serve(cancel));
        let stopped = self.shutdown();
        self.enter(PlayerState::Closed);
        played.and(stopped)
    }

    fn enter(&mut self, state: PlayerState) {
        log::debug!("player {} -> {}", self.state, state);
        self.state = state;
    }

    fn fail(&self, source: TransportError) -> PlayerError {
        log::error!("transport failed while {}: {source}", self.state);
        PlayerError::Transport {
            state: self.state,
            source,
        }
    }

    fn prime(&mut self) -> Result<(), PlayerError> {
        self.enter(PlayerState::Priming);
        self.transport
            .set_tempo(self.settings.bpm)
            .map_err(|e| self.fail(e))?;
        self.transport.start().map_err(|e| self.fail(e))?;
        self.drain(self.settings.queue_size)
    }

    fn serve(&mut self, cancel: &CancellationToken) -> Result<(), PlayerError> {
        self.enter(PlayerState::Running);
        while !cancel.is_cancelled() {
            let notifications = self
                .transport
                .poll(self.settings.poll_timeout)
                .map_err(|e| self.fail(e))?;
            for notification in notifications {
                match notification {
                    Notification::Stop => {
                        log::info!("end of piece reached");
                        return Ok(());
                    }
                    Notification::Drained => self.drain(self.settings.drain_size)?,
                    Notification::TempoChange { bpm } => {
                        self.transport.set_tempo(bpm).map_err(|e| self.fail(e))?
                    }
                }
            }
        }
        log::info!("playback cancelled");
        Ok(())
    }

    /// Push up to `n` items, interleaving a drain marker every `drain_size` items.
    fn drain(&mut self, n: usize) -> Result<(), PlayerError> {
        let cadence = self.settings.drain_size.max(1);
        let mut count = 0;
        while count < n {
            let Some(event) = self.sequence.next_event(&mut self.cursor.position) else {
                break;
            };
            if self.cursor.pushed % cadence == cadence - 1 {
                self.transport
                    .enqueue(event.tick, Queued::DrainMarker)
                    .map_err(|e| self.fail(e))?;
                count += 1;
                self.cursor.pushed += 1;
            }
            self.transport
                .enqueue(event.tick, Queued::Event(event.kind))
                .map_err(|e| self.fail(e))?;
            count += 1;
            self.cursor.pushed += 1;
        }
        self.transport.flush().map_err(|e| self.fail(e))?;
        log::debug!(
            "queued {count} items, next event {} (loop pass {})",
            self.cursor.position.index(),
            self.cursor.position.passes()
        );
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), PlayerError> {
        self.enter(PlayerState::Stopping);
        let cleared = self.transport.clear().map_err(|e| self.fail(e));
        let stopped = self.transport.stop().map_err(|e| self.fail(e));
        if !self.settings.settle.is_zero() {
            std::thread::sleep(self.settings.settle);
        }
        self.sequence.linearize();
        cleared.and(stopped)
    }
}
