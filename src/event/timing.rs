//! Musical time in integer ticks.
//!
//! Ticks are counted at [`PULSES_PER_QUARTER`] resolution. A rhythmic
//! divider `d` gives note slots of `PULSES_PER_QUARTER * 4 / d` ticks, so a
//! divider of 4 is a quarter note and 8 an eighth. Conversion to wall-clock
//! time happens only at the transport boundary.

use std::time::Duration;

/// Ticks per quarter note.
pub const PULSES_PER_QUARTER: u32 = 96;

/// Ticks cut from every detached note so consecutive notes do not blend.
pub const NOTE_GAP: u64 = 4;

/// Ticks in a whole note.
pub const TICKS_PER_WHOLE: u64 = PULSES_PER_QUARTER as u64 * 4;

/// The length of one note slot under a divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub ticks: u64,
    /// False when the divider does not land on a whole tick and the length was truncated.
    pub exact: bool,
}

impl Slot {
    /// Slot length for `divider`; truncates to whole ticks.
    pub fn for_divider(divider: f64) -> Self {
        let exact_ticks = TICKS_PER_WHOLE as f64 / divider;
        let ticks = exact_ticks as u64;
        Self {
            ticks,
            exact: exact_ticks.fract() == 0.0,
        }
    }

    /// Duration of a note occupying this slot.
    ///
    /// Detached notes lose [`NOTE_GAP`] ticks; legato notes gain one so they overlap the next.
    pub fn note_duration(self, legato: bool) -> u64 {
        if legato {
            self.ticks.saturating_add(1)
        } else {
            self.ticks.saturating_sub(NOTE_GAP)
        }
    }
}

/// Microseconds per quarter note at `bpm`.
pub fn micros_per_quarter(bpm: u32) -> u64 {
    60_000_000 / bpm.max(1) as u64
}

/// Wall-clock length of `ticks` at `bpm`.
pub fn ticks_to_duration(ticks: u64, bpm: u32) -> Duration {
    let micros = ticks as u128 * micros_per_quarter(bpm) as u128 / PULSES_PER_QUARTER as u128;
    Duration::from_micros(micros.min(u64::MAX as u128) as u64)
}

/// Whole ticks elapsed in `elapsed` at `bpm` (rounded down).
pub fn duration_to_ticks(elapsed: Duration, bpm: u32) -> u64 {
    let ticks =
        elapsed.as_micros() * PULSES_PER_QUARTER as u128 / micros_per_quarter(bpm) as u128;
    ticks.min(u64::MAX as u128) as u64
}
