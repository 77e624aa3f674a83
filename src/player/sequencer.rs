//! A [`Transport`] that times events in software and writes them to a MIDI sink.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use super::queue::{Clock, Scheduled, TimingQueue};
use super::transport::{Notification, Queued, Transport, TransportError};
use crate::dsl::context::DEFAULT_BPM;
use crate::event::EventKind;
use crate::midi::{MidiMessage, MidiSink};

/// Software sequencer over a [`MidiSink`].
///
/// Notes are split into note-on and note-off at enqueue time. Items meant
/// for the player come back from [`Transport::poll`] when they fall due.
pub struct SequencerTransport<S: MidiSink> {
    sink: S,
    queue: TimingQueue,
    clock: Option<Clock>,
    bpm: u32,
    /// Note-ons sent without their note-off yet, by (channel, note).
    sounding: HashMap<(u8, u8), usize>,
}

impl<S: MidiSink> SequencerTransport<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            queue: TimingQueue::new(),
            clock: None,
            bpm: DEFAULT_BPM,
            sounding: HashMap::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_some()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Send everything due at `now` and return the notifications that fell due.
    pub fn dispatch_due(&mut self, now: Instant) -> Result<Vec<Notification>, TransportError> {
        let Some(clock) = self.clock else {
            return Ok(Vec::new());
        };
        let mut notifications = Vec::new();
        for item in self.queue.pop_due(clock.tick_at(now)) {
            match item {
                Scheduled::Send(message) => self.send(message)?,
                Scheduled::Notify(notification) => notifications.push(notification),
            }
        }
        Ok(notifications)
    }

    /// Instant at which the next pending item falls due.
    pub fn next_due(&self) -> Option<Instant> {
        let clock = self.clock?;
        self.queue.next_tick().and_then(|tick| clock.instant_of(tick))
    }

    fn send(&mut self, message: MidiMessage) -> Result<(), TransportError> {
        match message {
            MidiMessage::NoteOn { channel, note, .. } => {
                *self.sounding.entry((channel, note)).or_default() += 1;
            }
            MidiMessage::NoteOff { channel, note } => {
                if let Some(count) = self.sounding.get_mut(&(channel, note)) {
                    *count -= 1;
                    if *count == 0 {
                        self.sounding.remove(&(channel, note));
                    }
                }
            }
            _ => {}
        }
        self.sink.send(&message)?;
        Ok(())
    }
}

impl<S: MidiSink> Transport for SequencerTransport<S> {
    fn set_tempo(&mut self, bpm: u32) -> Result<(), TransportError> {
        if bpm == 0 {
            return Err(TransportError::InvalidTempo(bpm));
        }
        if let Some(clock) = self.clock.as_mut() {
            clock.set_tempo(bpm, Instant::now());
        }
        log::debug!("tempo set to {bpm} bpm");
        self.bpm = bpm;
        Ok(())
    }

    fn start(&mut self) -> Result<(), TransportError> {
        self.clock = Some(Clock::new(self.bpm, Instant::now()));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TransportError> {
        self.clock = None;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), TransportError> {
        self.queue.clear();
        let mut sounding: Vec<(u8, u8)> = self.sounding.drain().map(|(key, _)| key).collect();
        sounding.sort_unstable();
        for (channel, note) in sounding {
            self.sink.send(&MidiMessage::NoteOff { channel, note })?;
        }
        Ok(())
    }

    fn enqueue(&mut self, tick: u64, item: Queued) -> Result<(), TransportError> {
        match item {
            Queued::Event(EventKind::Note {
                channel,
                pitch,
                velocity,
                duration,
            }) => {
                self.queue.push(
                    tick,
                    Scheduled::Send(MidiMessage::NoteOn {
                        channel,
                        note: pitch,
                        velocity,
                    }),
                );
                self.queue.push(
                    tick.saturating_add(duration),
                    Scheduled::Send(MidiMessage::NoteOff {
                        channel,
                        note: pitch,
                    }),
                );
            }
            Queued::Event(EventKind::Controller {
                channel,
                param,
                value,
            }) => self.queue.push(
                tick,
                Scheduled::Send(MidiMessage::control_change(channel, param, value)),
            ),
            Queued::Event(EventKind::ProgramChange { channel, program }) => self.queue.push(
                tick,
                Scheduled::Send(MidiMessage::program_change(channel, program)),
            ),
            Queued::Event(EventKind::Tempo { bpm }) => self
                .queue
                .push(tick, Scheduled::Notify(Notification::TempoChange { bpm })),
            Queued::Event(EventKind::End) => {
                self.queue.push(tick, Scheduled::Notify(Notification::Stop))
            }
            Queued::DrainMarker => self
                .queue
                .push(tick, Scheduled::Notify(Notification::Drained)),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        // Messages are written to the sink as they fall due.
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Vec<Notification>, TransportError> {
        let deadline = Instant::now() + timeout;
        if self.clock.is_none() {
            thread::sleep(timeout);
            return Err(TransportError::NotStarted);
        }
        loop {
            let now = Instant::now();
            let notifications = self.dispatch_due(now)?;
            if !notifications.is_empty() || now >= deadline {
                return Ok(notifications);
            }
            let wake = self.next_due().map_or(deadline, |due| due.min(deadline));
            thread::sleep(wake.saturating_duration_since(now));
        }
    }
}
