//! Software timing queue: tick-stamped items and the clock that makes them due.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::transport::Notification;
use crate::event::timing::{duration_to_ticks, micros_per_quarter, PULSES_PER_QUARTER};
use crate::midi::MidiMessage;

/// Maps queue ticks to wall-clock instants at a tempo.
///
/// The clock is anchored at a (tick, instant) pair; a tempo change re-anchors
/// it at the current position so earlier ticks keep their timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    anchor_tick: u64,
    anchor: Instant,
    bpm: u32,
}

impl Clock {
    /// A clock at tick 0 at `now`.
    pub fn new(bpm: u32, now: Instant) -> Self {
        Self {
            anchor_tick: 0,
            anchor: now,
            bpm,
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// The tick reached at `now`.
    pub fn tick_at(&self, now: Instant) -> u64 {
        self.anchor_tick
            .saturating_add(duration_to_ticks(now.saturating_duration_since(self.anchor), self.bpm))
    }

    /// The first instant at which `tick` is reached, if the platform clock can represent it.
    pub fn instant_of(&self, tick: u64) -> Option<Instant> {
        let ticks = tick.saturating_sub(self.anchor_tick) as u128;
        let micros = (ticks * micros_per_quarter(self.bpm) as u128)
            .div_ceil(PULSES_PER_QUARTER as u128);
        self.anchor
            .checked_add(Duration::from_micros(micros.min(u64::MAX as u128) as u64))
    }

    pub fn set_tempo(&mut self, bpm: u32, now: Instant) {
        self.anchor_tick = self.tick_at(now);
        self.anchor = now;
        self.bpm = bpm;
    }
}

/// What happens when a queued item becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    Send(MidiMessage),
    Notify(Notification),
}

/// Items ordered by tick, first-in first-out within a tick.
#[derive(Debug, Default)]
pub struct TimingQueue {
    items: BTreeMap<(u64, u64), Scheduled>,
    seq: u64,
}

impl TimingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u64, item: Scheduled) {
        self.items.insert((tick, self.seq), item);
        self.seq += 1;
    }

    /// Remove and return every item due at or before `tick`, in order.
    pub fn pop_due(&mut self, tick: u64) -> Vec<Scheduled> {
        let later = self.items.split_off(&(tick.saturating_add(1), 0));
        let due = std::mem::replace(&mut self.items, later);
        due.into_values().collect()
    }

    /// Tick of the earliest pending item.
    pub fn next_tick(&self) -> Option<u64> {
        self.items.keys().next().map(|&(tick, _)| tick)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
